//! Interactive loop shared by practice and review.

use std::fmt::Write as _;
use std::io::{BufRead, Write};

use services::{AnswerOutcome, AppServices, QuizSession, SessionError, SessionState};
use tiku_core::model::{PoolKind, Question, QuestionBody, SessionSummary, Submission, Verdict};

use crate::terminal::Terminal;

const QUIT: &str = ":q";
const SKIP: &str = ":s";
const EXPLAIN: &str = ":e";

/// How a run through a session ended.
pub enum Flow {
    Finished,
    Quit,
}

/// Ask every remaining question of `session`.
pub async fn play<R: BufRead, W: Write>(
    services: &AppServices,
    session: &mut QuizSession,
    term: &mut Terminal<R, W>,
) -> anyhow::Result<Flow> {
    let loop_svc = services.session_loop();
    writeln!(
        term.output,
        "输入答案后回车；{SKIP} 跳过，{EXPLAIN} AI 解析，{QUIT} 退出"
    )?;

    while session.state() == SessionState::Active {
        let question = session.current_question()?.clone();
        render_question(session, &question, term)?;

        loop {
            let Some(line) = term.prompt("> ")? else {
                return Ok(Flow::Quit);
            };
            match line.trim() {
                QUIT => return Ok(Flow::Quit),
                SKIP => break,
                EXPLAIN => {
                    explain(services, &question, term).await?;
                    continue;
                }
                _ => {}
            }

            match loop_svc.submit(session, &to_submission(&question, &line)) {
                Ok(outcome) => {
                    render_outcome(&outcome, term)?;
                    if let Flow::Quit = after_answer(services, &question, term).await? {
                        return Ok(Flow::Quit);
                    }
                    break;
                }
                Err(SessionError::MissingAnswer) => writeln!(term.output, "请先填写答案！")?,
                Err(err @ SessionError::SubmissionMismatch { .. }) => {
                    writeln!(term.output, "{err}")?;
                }
                Err(err) => return Err(err.into()),
            }
        }
        loop_svc.advance(session)?;
    }
    Ok(Flow::Finished)
}

async fn after_answer<R: BufRead, W: Write>(
    services: &AppServices,
    question: &Question,
    term: &mut Terminal<R, W>,
) -> anyhow::Result<Flow> {
    loop {
        let Some(line) = term.prompt("回车继续 > ")? else {
            return Ok(Flow::Finished);
        };
        match line.trim() {
            QUIT => return Ok(Flow::Quit),
            EXPLAIN => explain(services, question, term).await?,
            _ => return Ok(Flow::Finished),
        }
    }
}

fn to_submission(question: &Question, line: &str) -> Submission {
    if question.pool_kind() == PoolKind::Judge {
        if let Some(verdict) = parse_verdict(line) {
            return Submission::from(verdict);
        }
    }
    Submission::text(line)
}

fn parse_verdict(raw: &str) -> Option<Verdict> {
    match raw.trim().to_lowercase().as_str() {
        "对" | "√" | "t" | "true" | "y" => Some(Verdict::True),
        "错" | "×" | "f" | "false" | "n" => Some(Verdict::False),
        _ => None,
    }
}

fn render_question<R: BufRead, W: Write>(
    session: &QuizSession,
    question: &Question,
    term: &mut Terminal<R, W>,
) -> std::io::Result<()> {
    let progress = session.progress();
    writeln!(term.output)?;
    writeln!(
        term.output,
        "[{}/{}] {} · {}",
        progress.position,
        progress.total,
        session.kind().label(),
        question.variant_label()
    )?;
    writeln!(term.output, "{}", question.stem())?;
    if let Some(options) = question.options() {
        for (key, text) in options.iter() {
            writeln!(term.output, "  {}. {text}", key.as_char())?;
        }
    }
    let hint = match question.body() {
        QuestionBody::SingleChoice { .. } => "单选题请输入一个选项字母".to_string(),
        QuestionBody::MultiChoice { .. } => "多选题请输入所有正确选项，如 AC".to_string(),
        QuestionBody::FillBlank { .. } => format!(
            "共{}个空，多个答案用 | 分隔，如：答案1 | 答案2",
            question.blank_count()
        ),
        QuestionBody::TrueFalse { .. } => "请输入 对 或 错".to_string(),
        QuestionBody::LookupEntry { .. } => "请输入答案".to_string(),
    };
    writeln!(term.output, "提示：{hint}")
}

fn render_outcome<R: BufRead, W: Write>(
    outcome: &AnswerOutcome,
    term: &mut Terminal<R, W>,
) -> std::io::Result<()> {
    if outcome.is_correct {
        write!(term.output, "✅ 回答正确！")?;
    } else {
        write!(term.output, "❌ 回答错误，正确答案：{}", outcome.reference)?;
    }
    if outcome.counted {
        writeln!(term.output)
    } else {
        writeln!(term.output, "（重复作答，不计分）")
    }
}

/// Final screen of a finished session.
pub fn render_summary<R: BufRead, W: Write>(
    summary: &SessionSummary,
    term: &mut Terminal<R, W>,
) -> std::io::Result<()> {
    let seconds = summary.elapsed().num_seconds().max(0);
    writeln!(term.output)?;
    if !summary.kind().is_scored() {
        return writeln!(term.output, "自定义练习完成！共 {} 题", summary.total());
    }
    writeln!(
        term.output,
        "练习结束：得分 {}/{}，正确率 {:.0}%，用时 {}分{}秒",
        summary.score(),
        summary.total(),
        summary.accuracy() * 100.0,
        seconds / 60,
        seconds % 60
    )?;
    if summary.passed() {
        writeln!(term.output, "🎉 恭喜通过！")
    } else {
        writeln!(term.output, "💪 继续加油！")
    }
}

async fn explain<R: BufRead, W: Write>(
    services: &AppServices,
    question: &Question,
    term: &mut Terminal<R, W>,
) -> anyhow::Result<()> {
    super::explain::execute(
        services,
        explain_stem(question),
        question.reference_answer(),
        term,
    )
    .await
}

fn explain_stem(question: &Question) -> String {
    let mut stem = question.stem().to_string();
    if let Some(options) = question.options() {
        for (key, text) in options.iter() {
            let _ = write!(stem, "\n{}. {text}", key.as_char());
        }
    }
    stem
}

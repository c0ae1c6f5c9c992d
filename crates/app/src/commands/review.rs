use std::collections::BTreeSet;
use std::io::{BufRead, Write};

use anyhow::Context;
use services::{AppServices, SessionError};
use tiku_core::model::QuestionId;

use crate::terminal::Terminal;

use super::quiz::{Flow, play, render_summary};

/// Unscored review of chosen lookup entries.
pub async fn execute<R: BufRead, W: Write>(
    services: &AppServices,
    ids: Option<String>,
    term: &mut Terminal<R, W>,
) -> anyhow::Result<()> {
    let entries = services.bank().lookup_entries();
    if entries.is_empty() {
        writeln!(term.output, "自定义题库暂无题目")?;
        return Ok(());
    }

    let raw = match ids {
        Some(raw) => raw,
        None => {
            writeln!(term.output, "请勾选想练习的题目：")?;
            for entry in entries {
                writeln!(term.output, "  {}. {}", entry.id(), entry.stem())?;
            }
            match term.prompt("题号（逗号分隔，all 表示全部）> ")? {
                Some(line) => line,
                None => return Ok(()),
            }
        }
    };
    let all: Vec<QuestionId> = entries.iter().map(|entry| entry.id()).collect();
    let chosen = parse_ids(&raw, &all)?;

    let mut session = match services.session_loop().start_custom(chosen) {
        Ok(session) => session,
        Err(SessionError::EmptySelection) => {
            writeln!(term.output, "请先勾选题目！")?;
            return Ok(());
        }
        Err(SessionError::EmptyPool) => {
            writeln!(term.output, "所选题号不存在")?;
            return Ok(());
        }
        Err(err) => return Err(err.into()),
    };

    if let Flow::Finished = play(services, &mut session, term).await? {
        render_summary(&session.summary()?, term)?;
    }
    Ok(())
}

/// Parses `1,3 5` style lists; `all` selects every id in `all`.
fn parse_ids(raw: &str, all: &[QuestionId]) -> anyhow::Result<Vec<QuestionId>> {
    if raw.trim().eq_ignore_ascii_case("all") {
        return Ok(all.to_vec());
    }
    let mut ids = BTreeSet::new();
    for part in raw
        .split([',', '，', ' '])
        .filter(|part| !part.trim().is_empty())
    {
        let id: QuestionId = part
            .parse()
            .with_context(|| format!("invalid question number {part:?}"))?;
        ids.insert(id);
    }
    Ok(ids.into_iter().collect())
}

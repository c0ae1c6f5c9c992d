use std::io::{BufRead, Write};

use services::{AppServices, NO_REFERENCE_ANSWER};

use crate::terminal::Terminal;

/// Print matching lookup entries; with `explain`, ask about the first one.
pub async fn execute<R: BufRead, W: Write>(
    services: &AppServices,
    keyword: &str,
    explain: bool,
    term: &mut Terminal<R, W>,
) -> anyhow::Result<()> {
    let lookup = services.lookup();
    let hits = lookup.search(keyword);
    let Some(first) = hits.first() else {
        writeln!(term.output, "未找到相关题目")?;
        return Ok(());
    };
    if hits.iter().any(|hit| hit.fuzzy) {
        writeln!(term.output, "没有完全匹配的题目，以下是相近结果：")?;
    }
    for hit in &hits {
        writeln!(term.output, "【题目】：{}", hit.stem)?;
        writeln!(term.output, "【答案】：{}", hit.answer)?;
        writeln!(term.output, "{}", "-".repeat(50))?;
    }

    if explain {
        let reference = lookup.answer_for(&first.stem).unwrap_or(NO_REFERENCE_ANSWER);
        super::explain::execute(services, first.stem.clone(), reference, term).await?;
    }
    Ok(())
}

use std::io::{BufRead, Write};

use services::{API_KEY_ENV, AppServices};

use crate::terminal::Terminal;

/// Ask the explanation endpoint about `stem` and print the reply.
///
/// Without an API key only a hint is printed.
pub async fn execute<R: BufRead, W: Write>(
    services: &AppServices,
    stem: String,
    reference: &str,
    term: &mut Terminal<R, W>,
) -> anyhow::Result<()> {
    let explanation = services.explanation();
    if !explanation.enabled() {
        writeln!(term.output, "请先设置环境变量 {API_KEY_ENV} 以启用 AI 解析")?;
        return Ok(());
    }
    writeln!(term.output, "正在请求解析（{}）...", explanation.settings().model())?;

    let handle = explanation.spawn_explain(stem, reference);
    match handle.await? {
        Ok(text) => writeln!(term.output, "{text}")?,
        Err(err) => writeln!(term.output, "解析失败：{err}")?,
    }
    Ok(())
}

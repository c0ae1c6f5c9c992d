use std::io::{BufRead, Write};

use services::{AppServices, SessionError};
use tiku_core::model::PoolKind;

use crate::terminal::Terminal;

use super::quiz::{Flow, play, render_summary};

/// Random practice over one pool, offering a retry after each summary.
pub async fn execute<R: BufRead, W: Write>(
    services: &AppServices,
    kind: PoolKind,
    term: &mut Terminal<R, W>,
) -> anyhow::Result<()> {
    let loop_svc = services.session_loop();
    let mut session = match loop_svc.start_practice(kind) {
        Ok(session) => session,
        Err(SessionError::EmptyPool) => {
            writeln!(term.output, "{}题库暂无题目", kind.label())?;
            return Ok(());
        }
        Err(err) => return Err(err.into()),
    };

    loop {
        if let Flow::Quit = play(services, &mut session, term).await? {
            return Ok(());
        }
        render_summary(&session.summary()?, term)?;

        let again = term.prompt("再来一次？(y/N) ")?;
        if !matches!(again.as_deref().map(str::trim), Some("y" | "Y")) {
            return Ok(());
        }
        session = loop_svc.restart(&session)?;
    }
}

use std::io::{BufRead, Write};

use services::AppServices;
use tiku_core::model::PoolKind;

use crate::terminal::Terminal;

pub fn execute<R: BufRead, W: Write>(
    services: &AppServices,
    term: &mut Terminal<R, W>,
) -> anyhow::Result<()> {
    let bank = services.bank();
    for kind in PoolKind::PRACTICE.into_iter().chain([PoolKind::Lookup]) {
        writeln!(term.output, "{}（{}）：{} 题", kind.label(), kind, bank.pool_size(kind))?;
    }
    writeln!(term.output, "合计：{} 题", bank.len())?;
    Ok(())
}

use std::io::{BufRead, Write};

use anyhow::bail;
use services::{API_KEY_ENV, AppServices};
use tiku_core::model::{AppSettingsDraft, KNOWN_MODELS};
use tracing::info;

use crate::SettingsAction;
use crate::terminal::Terminal;

pub async fn execute<R: BufRead, W: Write>(
    services: &mut AppServices,
    action: SettingsAction,
    term: &mut Terminal<R, W>,
) -> anyhow::Result<()> {
    match action {
        SettingsAction::Show => show(services, term),
        SettingsAction::Models => {
            for (label, id, recommended) in KNOWN_MODELS {
                let mark = if recommended { "（推荐）" } else { "" };
                writeln!(term.output, "{label}{mark}: {id}")?;
            }
            Ok(())
        }
        SettingsAction::Set {
            api_key,
            api_url,
            model,
            reasoning,
            system_prompt,
        } => {
            let current = services.explanation().settings().clone();
            let mut draft = AppSettingsDraft::from_settings(&current);
            if api_key.is_some() {
                draft.api_key = api_key;
            }
            if api_url.is_some() {
                draft.api_url = api_url;
            }
            if model.is_some() {
                draft.model = model;
            }
            if let Some(reasoning) = reasoning {
                draft.enable_reasoning = reasoning;
            }
            if system_prompt.is_some() {
                draft.system_prompt = system_prompt;
            }

            let saved = services.settings().save(draft).await?;
            info!(url = saved.api_url(), "settings updated");
            services.apply_settings(saved);
            writeln!(term.output, "配置已保存！API 密钥不会写入配置文件，请通过 {API_KEY_ENV} 提供")?;
            show(services, term)
        }
    }
}

fn show<R: BufRead, W: Write>(services: &AppServices, term: &mut Terminal<R, W>) -> anyhow::Result<()> {
    let explanation = services.explanation();
    let settings = explanation.settings();
    writeln!(term.output, "API 地址：{}", settings.api_url())?;
    writeln!(term.output, "模型：{}", settings.model())?;
    writeln!(
        term.output,
        "深度思考：{}",
        if settings.enable_reasoning() { "开启" } else { "关闭" }
    )?;
    writeln!(
        term.output,
        "系统提示词：{}",
        settings.system_prompt().unwrap_or("（无）")
    )?;
    writeln!(
        term.output,
        "API 密钥：{}",
        if settings.has_api_key() { "已设置" } else { "未设置" }
    )?;
    Ok(())
}

/// Sends a greeting to the configured endpoint.
pub async fn test_api<R: BufRead, W: Write>(
    services: &AppServices,
    term: &mut Terminal<R, W>,
) -> anyhow::Result<()> {
    let explanation = services.explanation();
    if !explanation.enabled() {
        bail!("请先设置环境变量 {API_KEY_ENV}");
    }
    writeln!(term.output, "正在测试连接...")?;
    match explanation.test_connection().await {
        Ok(_) => {
            writeln!(term.output, "✅ 连接成功！模型响应正常")?;
            Ok(())
        }
        Err(err) => bail!("❌ 连接失败：{err}"),
    }
}

//! CLI integration tests using assert_cmd.

use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn tiku(data_dir: &Path) -> Command {
    #[allow(deprecated)]
    let mut cmd = Command::cargo_bin("tiku").unwrap();
    cmd.env_remove("SILICON_API_KEY")
        .env_remove("RUST_LOG")
        .arg("--data-dir")
        .arg(data_dir);
    cmd
}

fn bank_dir() -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("题库.csv"),
        "题目,题目的文字答案\n货币的本质是什么,一般等价物\n通货膨胀的定义,物价持续上涨\n",
    )
    .unwrap();
    std::fs::write(
        dir.path().join("题库_选择题.csv"),
        "单选一,甲,乙,,,B,单选题\n",
    )
    .unwrap();
    std::fs::write(dir.path().join("题库_判断题.csv"), "判断一,对\n").unwrap();
    dir
}

#[test]
fn help_lists_subcommands() {
    let dir = tempfile::tempdir().unwrap();
    tiku(dir.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("practice"))
        .stdout(predicate::str::contains("search"))
        .stdout(predicate::str::contains("test-api"));
}

#[test]
fn stats_counts_every_pool() {
    let dir = bank_dir();
    tiku(dir.path())
        .arg("stats")
        .assert()
        .success()
        .stdout(predicate::str::contains("选择题（choice）：1 题"))
        .stdout(predicate::str::contains("填空题（fill）：0 题"))
        .stdout(predicate::str::contains("合计：4 题"));
}

#[test]
fn search_prints_answers() {
    let dir = bank_dir();
    tiku(dir.path())
        .args(["search", "货币"])
        .assert()
        .success()
        .stdout(predicate::str::contains("【答案】：一般等价物"));

    tiku(dir.path())
        .args(["search", "zzz"])
        .assert()
        .success()
        .stdout(predicate::str::contains("未找到相关题目"));
}

#[test]
fn search_explain_without_key_prints_hint() {
    let dir = bank_dir();
    tiku(dir.path())
        .args(["search", "货币", "--explain"])
        .assert()
        .success()
        .stdout(predicate::str::contains("【答案】：一般等价物"))
        .stdout(predicate::str::contains("请先设置环境变量 SILICON_API_KEY"));
}

#[tokio::test(flavor = "multi_thread")]
async fn search_explain_asks_about_the_first_hit() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(body_string_contains("货币的本质是什么"))
        .and(body_string_contains("一般等价物"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "choices": [{"index": 0, "message": {"role": "assistant", "content": "货币是固定充当一般等价物的商品"}}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let dir = bank_dir();
    let config = serde_json::json!({
        "api_url": format!("{}/v1/chat/completions", server.uri()),
        "model": "test-model",
    });
    std::fs::write(dir.path().join("config.json"), config.to_string()).unwrap();

    let data_dir = dir.path().to_path_buf();
    tokio::task::spawn_blocking(move || {
        tiku(&data_dir)
            .env("SILICON_API_KEY", "sk-test")
            .args(["search", "货币", "--explain"])
            .assert()
            .success()
            .stdout(predicate::str::contains("正在请求解析（test-model）"))
            .stdout(predicate::str::contains("货币是固定充当一般等价物的商品"));
    })
    .await
    .unwrap();
}

#[test]
fn practice_judge_session_reaches_summary() {
    let dir = bank_dir();
    tiku(dir.path())
        .args(["practice", "judge"])
        .write_stdin("\n对\n\nn\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("请先填写答案！"))
        .stdout(predicate::str::contains("✅ 回答正确！"))
        .stdout(predicate::str::contains("得分 1/1"))
        .stdout(predicate::str::contains("恭喜通过"));
}

#[test]
fn practice_empty_pool_reports_it() {
    let dir = bank_dir();
    tiku(dir.path())
        .args(["practice", "fill"])
        .assert()
        .success()
        .stdout(predicate::str::contains("填空题题库暂无题目"));
}

#[test]
fn practice_rejects_lookup_pool() {
    let dir = bank_dir();
    tiku(dir.path())
        .args(["practice", "lookup"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot be practiced"));
}

#[test]
fn review_of_chosen_entries_is_unscored() {
    let dir = bank_dir();
    tiku(dir.path())
        .args(["review", "--ids", "1"])
        .write_stdin("等价物\n\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("✅ 回答正确！"))
        .stdout(predicate::str::contains("自定义练习完成！共 1 题"));
}

#[test]
fn settings_set_requires_api_key() {
    let dir = bank_dir();
    tiku(dir.path())
        .args(["settings", "set", "--model", "Qwen/Qwen2-7B-Instruct"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("API key"));
}

#[test]
fn settings_set_never_writes_the_key() {
    let dir = bank_dir();
    tiku(dir.path())
        .args(["settings", "set", "--api-key", "sk-secret", "--reasoning", "true"])
        .assert()
        .success();

    let raw = std::fs::read_to_string(dir.path().join("config.json")).unwrap();
    assert!(raw.contains("\"enable_reasoning\": true"));
    assert!(!raw.contains("sk-secret"));

    tiku(dir.path())
        .args(["settings", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("深度思考：开启"))
        .stdout(predicate::str::contains("API 密钥：未设置"));
}

#[test]
fn settings_set_prints_the_applied_settings() {
    let dir = bank_dir();
    tiku(dir.path())
        .args(["settings", "set", "--api-key", "sk-secret", "--model", "Qwen/Qwen2-7B-Instruct"])
        .assert()
        .success()
        .stdout(predicate::str::contains("配置已保存！"))
        .stdout(predicate::str::contains("模型：Qwen/Qwen2-7B-Instruct"))
        .stdout(predicate::str::contains("API 密钥：已设置"));
}

#[test]
fn test_api_without_key_fails() {
    let dir = bank_dir();
    tiku(dir.path())
        .arg("test-api")
        .assert()
        .failure()
        .stderr(predicate::str::contains("SILICON_API_KEY"));
}

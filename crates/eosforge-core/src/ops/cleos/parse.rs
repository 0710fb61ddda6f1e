//! Readers for successful `cleos` output, prose or JSON.

use crate::{
    infra::{process::ProcessOutput, toolchain::ToolOp},
    ops::cleos::{KeyPair, ResponseError},
};
use serde_json::Value;

const DEPLOY_PAYLOAD_PLACEHOLDER: &str = "contract code data, deleted for readability";

/// Decode stdout as one JSON document.
pub fn json(op: ToolOp, out: &ProcessOutput) -> Result<Value, ResponseError> {
    let text = out.stdout.trim();
    let start = text
        .find(['{', '['])
        .ok_or_else(|| ResponseError::unexpected(op, "no JSON document in output"))?;

    serde_json::from_str(&text[start..])
        .map_err(|err| ResponseError::unexpected(op, err.to_string()))
}

/// `Private key: …` / `Public key: …` lines of `create key --to-console`.
pub fn key_pair(out: &ProcessOutput) -> Result<KeyPair, ResponseError> {
    let field = |label: &str| {
        out.stdout
            .lines()
            .find_map(|line| line.trim().strip_prefix(label))
            .map(|v| v.trim().to_string())
    };

    match (field("Public key:"), field("Private key:")) {
        (Some(public), Some(private)) => Ok(KeyPair::new(public, private)),
        _ => Err(ResponseError::unexpected(ToolOp::CreateKey, "missing key lines")),
    }
}

/// The quoted password printed last by `wallet create --to-console`.
pub fn wallet_password(out: &ProcessOutput) -> Result<String, ResponseError> {
    out.stdout
        .lines()
        .rev()
        .map(str::trim)
        .find(|line| line.len() > 2 && line.starts_with('"') && line.ends_with('"'))
        .map(|line| line[1..line.len() - 1].to_string())
        .ok_or_else(|| ResponseError::unexpected(ToolOp::WalletCreate, "no password in output"))
}

/// Transaction id from a JSON trace (`transaction_id`) or from the prose
/// `executed transaction: <id> …` line.
#[must_use]
pub fn transaction_id(out: &ProcessOutput) -> Option<String> {
    const KEYWORD: &str = "executed transaction: ";

    if let Ok(value) = serde_json::from_str::<Value>(out.stdout.trim())
        && let Some(id) = value.get("transaction_id").and_then(Value::as_str)
    {
        return Some(id.to_string());
    }

    [&out.stdout, &out.stderr].into_iter().find_map(|text| {
        let rest = &text[text.find(KEYWORD)? + KEYWORD.len()..];
        rest.split_whitespace().next().map(str::to_string)
    })
}

/// Console text printed by the executed actions. JSON traces are walked
/// depth-first through inline traces; prose output contributes its `>>`
/// lines.
#[must_use]
pub fn console(out: &ProcessOutput) -> String {
    if let Ok(value) = serde_json::from_str::<Value>(out.stdout.trim())
        && let Some(traces) = value.pointer("/processed/action_traces").and_then(Value::as_array)
    {
        let mut text = String::new();
        for trace in traces {
            collect_console(trace, &mut text);
        }
        return text;
    }

    [&out.stdout, &out.stderr]
        .into_iter()
        .flat_map(|text| text.lines())
        .filter_map(|line| line.trim_start().strip_prefix(">>"))
        .map(str::trim)
        .collect::<Vec<_>>()
        .join("\n")
}

fn collect_console(trace: &Value, text: &mut String) {
    if let Some(console) = trace.get("console").and_then(Value::as_str)
        && !console.is_empty()
    {
        if !text.is_empty() {
            text.push('\n');
        }
        text.push_str(console);
    }

    if let Some(inline) = trace.get("inline_traces").and_then(Value::as_array) {
        for child in inline {
            collect_console(child, text);
        }
    }
}

/// Replace the bulky code/ABI payloads of a deploy transaction record.
pub fn strip_deploy_payload(record: &mut Value) {
    let placeholder = || Value::String(DEPLOY_PAYLOAD_PLACEHOLDER.to_string());

    if let Some(actions) = record.get_mut("actions").and_then(Value::as_array_mut) {
        for action in actions {
            if let Some(data) = action.get_mut("data") {
                *data = placeholder();
            }
        }
    }

    if let Some(traces) = record
        .pointer_mut("/processed/action_traces")
        .and_then(Value::as_array_mut)
    {
        for trace in traces {
            for field in ["/act/data", "/act/hex_data"] {
                if let Some(data) = trace.pointer_mut(field) {
                    *data = placeholder();
                }
            }
        }
    }
}

/// Owner and active public keys from a `get account --json` document.
pub fn permission_keys(account: &Value) -> Result<(String, String), ResponseError> {
    let key_of = |perm: &str| {
        account
            .get("permissions")?
            .as_array()?
            .iter()
            .find(|p| p.get("perm_name").and_then(Value::as_str) == Some(perm))?
            .pointer("/required_auth/keys/0/key")?
            .as_str()
            .map(str::to_string)
    };

    let owner = key_of("owner")
        .ok_or_else(|| ResponseError::unexpected(ToolOp::GetAccount, "no owner key"))?;
    let active = key_of("active").unwrap_or_else(|| owner.clone());

    Ok((owner, active))
}

/// `account_names` of a `get accounts` document.
pub fn account_names(out: &ProcessOutput) -> Result<Vec<String>, ResponseError> {
    let value = json(ToolOp::GetAccounts, out)?;

    Ok(value
        .get("account_names")
        .and_then(Value::as_array)
        .map(|names| {
            names
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default())
}

/// Public keys listed by `wallet keys`.
pub fn wallet_keys(out: &ProcessOutput) -> Result<Vec<String>, ResponseError> {
    let value = json(ToolOp::WalletKeys, out)?;
    let keys = value
        .as_array()
        .ok_or_else(|| ResponseError::unexpected(ToolOp::WalletKeys, "expected a list"))?;

    Ok(keys.iter().filter_map(Value::as_str).map(str::to_string).collect())
}

/// Wallets listed by `wallet list`, each with its unlocked flag (`*`).
#[must_use]
pub fn wallet_list(out: &ProcessOutput) -> Vec<(String, bool)> {
    out.stdout
        .lines()
        .map(|line| line.trim().trim_end_matches(','))
        .filter(|line| line.len() > 2 && line.starts_with('"') && line.ends_with('"'))
        .map(|line| {
            let entry = &line[1..line.len() - 1];
            entry.strip_suffix(" *").map_or_else(
                || (entry.to_string(), false),
                |name| (name.to_string(), true),
            )
        })
        .collect()
}

/// `code hash: …` line of `get code`. An all-zero hash means no code.
#[must_use]
pub fn code_hash(out: &ProcessOutput) -> Option<String> {
    out.stdout
        .lines()
        .find_map(|line| line.trim().strip_prefix("code hash:"))
        .map(|hash| hash.trim().to_string())
        .filter(|hash| !hash.is_empty() && hash.chars().any(|c| c != '0'))
}

/// Rows of a `get table` document.
pub fn table_rows(out: &ProcessOutput) -> Result<Vec<Value>, ResponseError> {
    let value = json(ToolOp::GetTable, out)?;

    value
        .get("rows")
        .and_then(Value::as_array)
        .cloned()
        .ok_or_else(|| ResponseError::unexpected(ToolOp::GetTable, "no rows field"))
}

/// `head_block_num` of a `get info` document.
pub fn head_block(out: &ProcessOutput) -> Result<u64, ResponseError> {
    json(ToolOp::GetInfo, out)?
        .get("head_block_num")
        .and_then(Value::as_u64)
        .ok_or_else(|| ResponseError::unexpected(ToolOp::GetInfo, "no head_block_num"))
}

///
/// TESTS
///

//! Constitution rule set carried by constitution proposals
//!
//! Blob layout, repeated `CONSTITUTION_RULE_COUNT` times:
//! `u8 title_len || title || u16 content_len || content` (UTF-8).

use crate::constants::*;
use crate::error::{Result, WalletError};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rule {
    pub title: String,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Constitution {
    rules: Vec<Rule>,
}

impl Constitution {
    pub fn new(rules: Vec<Rule>) -> Result<Self> {
        if rules.len() != CONSTITUTION_RULE_COUNT {
            return Err(WalletError::InvalidScriptFormat(format!(
                "constitution needs {} rules, got {}",
                CONSTITUTION_RULE_COUNT,
                rules.len()
            )));
        }
        for (i, rule) in rules.iter().enumerate() {
            if rule.title.len() > MAX_RULE_TITLE_LENGTH {
                return Err(WalletError::InvalidScriptFormat(format!("rule {} title too long", i)));
            }
            if rule.content.len() > MAX_RULE_CONTENT_LENGTH {
                return Err(WalletError::InvalidScriptFormat(format!("rule {} content too long", i)));
            }
        }
        Ok(Self { rules })
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::new();
        for rule in &self.rules {
            out.push(rule.title.len() as u8);
            out.extend_from_slice(rule.title.as_bytes());
            out.extend_from_slice(&(rule.content.len() as u16).to_be_bytes());
            out.extend_from_slice(rule.content.as_bytes());
        }
        out
    }

    /// Decode a blob; `None` on truncation, trailing bytes, bad UTF-8 or limits
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        let mut rules = Vec::with_capacity(CONSTITUTION_RULE_COUNT);
        let mut pos = 0;
        for _ in 0..CONSTITUTION_RULE_COUNT {
            let title_len = *bytes.get(pos)? as usize;
            pos += 1;
            let title = std::str::from_utf8(bytes.get(pos..pos + title_len)?).ok()?;
            pos += title_len;
            let content_len = u16::from_be_bytes(bytes.get(pos..pos + 2)?.try_into().ok()?) as usize;
            pos += 2;
            let content = std::str::from_utf8(bytes.get(pos..pos + content_len)?).ok()?;
            pos += content_len;
            rules.push(Rule {
                title: title.to_string(),
                content: content.to_string(),
            });
        }
        if pos != bytes.len() {
            return None;
        }
        Constitution::new(rules).ok()
    }
}

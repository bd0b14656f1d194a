//! Report writers. Absent optional fields are omitted, never null.

use anyhow::{Context, Result};
use std::fmt;
use std::io::Write;
use std::str::FromStr;

use crate::adapters::ProbeResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Json,
    Yaml,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "json" => Ok(OutputFormat::Json),
            "yaml" | "yml" => Ok(OutputFormat::Yaml),
            other => Err(other.to_string()),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Json => f.write_str("json"),
            OutputFormat::Yaml => f.write_str("yaml"),
        }
    }
}

/// Serialize `results` to `writer` in the requested format.
pub fn write_report<W: Write>(mut writer: W, format: OutputFormat, results: &[ProbeResult]) -> Result<()> {
    match format {
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut writer, results).context("Failed to encode JSON report")?;
            writer.write_all(b"\n")?;
        }
        OutputFormat::Yaml => {
            serde_yaml::to_writer(&mut writer, results).context("Failed to encode YAML report")?;
        }
    }
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::ProbeStatus;

    fn sample() -> Vec<ProbeResult> {
        let mut described = ProbeResult::ok("deepseek", "deepseek-chat", vec!["chat".into()]);
        described.meta.insert("owned_by".into(), "deepseek".into());
        vec![
            described,
            ProbeResult::unavailable("deepseek", "deepseek-coder", ProbeStatus::Denied, "no access"),
            ProbeResult::unavailable("deepseek", "deepseek-x", ProbeStatus::Other("active".into()), ""),
        ]
    }

    #[test]
    fn test_format_parse() {
        assert_eq!("JSON".parse::<OutputFormat>(), Ok(OutputFormat::Json));
        assert_eq!("yaml".parse::<OutputFormat>(), Ok(OutputFormat::Yaml));
        assert_eq!("xml".parse::<OutputFormat>(), Err("xml".to_string()));
    }

    #[test]
    fn test_json_round_trip() {
        let mut buf = Vec::new();
        write_report(&mut buf, OutputFormat::Json, &sample()).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.ends_with('\n'));
        assert!(!text.contains("null"));

        let decoded: Vec<ProbeResult> = serde_json::from_str(&text).unwrap();
        assert_eq!(decoded, sample());
    }

    #[test]
    fn test_yaml_round_trip() {
        let mut buf = Vec::new();
        write_report(&mut buf, OutputFormat::Yaml, &sample()).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.contains("status: denied"));
        assert!(!text.contains("reason: ''"));

        let decoded: Vec<ProbeResult> = serde_yaml::from_str(&text).unwrap();
        assert_eq!(decoded, sample());
    }

    #[test]
    fn test_absent_fields_omitted() {
        let mut buf = Vec::new();
        let row = vec![ProbeResult::unavailable("fake", "m", ProbeStatus::Fail, "")];
        write_report(&mut buf, OutputFormat::Json, &row).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&buf).unwrap();
        let obj = value[0].as_object().unwrap();
        assert!(!obj.contains_key("reason"));
        assert!(!obj.contains_key("capabilities"));
        assert!(!obj.contains_key("meta"));
    }
}

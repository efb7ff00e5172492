use anyhow::{anyhow, Result};
use serde::{Deserialize, Deserializer, Serializer};
use std::time::Duration;

pub use serde_with::{serde_as, DeserializeAs, SerializeAs};

/// Duration 的人性化格式化器
///
/// 支持格式: "500ms", "3s", "2m", "1h", "1m30s"
pub struct HumanDur;

impl SerializeAs<Duration> for HumanDur {
    fn serialize_as<S>(source: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&format_duration(*source))
    }
}

impl<'de> DeserializeAs<'de, Duration> for HumanDur {
    fn deserialize_as<D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        parse_duration(&s).map_err(serde::de::Error::custom)
    }
}

/// 解析时间字符串: "1m30s" -> Duration
pub fn parse_duration(s: &str) -> Result<Duration> {
    let s = s.trim().to_lowercase();
    if s.is_empty() {
        return Err(anyhow!("空字符串"));
    }

    let re = regex_lite::Regex::new(r"(\d+(?:\.\d+)?)(ms|s|m|h)").expect("valid regex");

    let mut total = Duration::ZERO;
    let mut consumed = 0;
    for caps in re.captures_iter(&s) {
        let whole = caps.get(0).expect("group 0 always matches");
        if whole.start() != consumed {
            return Err(anyhow!("无效的时间格式: {}", s));
        }
        consumed = whole.end();

        let value: f64 = caps[1]
            .parse()
            .map_err(|_| anyhow!("无效数字: {}", &caps[1]))?;
        total += match &caps[2] {
            "ms" => Duration::from_secs_f64(value / 1000.0),
            "s" => Duration::from_secs_f64(value),
            "m" => Duration::from_secs_f64(value * 60.0),
            _ => Duration::from_secs_f64(value * 3600.0),
        };
    }

    if consumed != s.len() {
        return Err(anyhow!("无效的时间格式: {}", s));
    }

    Ok(total)
}

/// 格式化 Duration，不足一秒用毫秒表示
pub fn format_duration(d: Duration) -> String {
    if d.subsec_millis() != 0 || d.as_secs() == 0 {
        return format!("{}ms", d.as_millis());
    }

    let secs = d.as_secs();
    let (h, m, s) = (secs / 3600, secs % 3600 / 60, secs % 60);
    let mut out = String::new();
    if h > 0 {
        out.push_str(&format!("{}h", h));
    }
    if m > 0 {
        out.push_str(&format!("{}m", m));
    }
    if s > 0 {
        out.push_str(&format!("{}s", s));
    }
    out
}

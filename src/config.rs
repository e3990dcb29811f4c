use std::{
    collections::HashMap,
    path::{Path, PathBuf},
    process::Command,
    time::Duration,
};

use crate::{ClientError, client::ClientSettings, liveness::KillSignal};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RuntimeConfig {
    pub ping_timeout: Duration,
    pub consider_size_hints_maximized: bool,
    pub kill_signal: KillSignal,
    pub workspace_count: u32,
    pub ignore_activation_messages: bool,
    /// Used when `RUST_LOG` is unset.
    pub log_filter: Option<String>,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        let settings = ClientSettings::default();
        Self {
            ping_timeout: settings.ping_timeout,
            consider_size_hints_maximized: settings.consider_size_hints_maximized,
            kill_signal: KillSignal::Term,
            workspace_count: settings.workspace_count,
            ignore_activation_messages: settings.ignore_activation_messages,
            log_filter: None,
        }
    }
}

impl RuntimeConfig {
    pub fn client_settings(&self) -> ClientSettings {
        ClientSettings {
            ping_timeout: self.ping_timeout,
            workspace_count: self.workspace_count,
            consider_size_hints_maximized: self.consider_size_hints_maximized,
            ignore_activation_messages: self.ignore_activation_messages,
        }
    }

    /// Builds a config from flattened `key=value` pairs. Unknown keys are ignored.
    pub fn from_values(values: &HashMap<String, String>) -> Result<Self, ClientError> {
        let mut config = RuntimeConfig::default();

        let timeout_ms = parse_u32(
            values,
            "ping_timeout_ms",
            config.ping_timeout.as_millis().try_into().unwrap_or(u32::MAX),
        )?;
        if timeout_ms == 0 {
            return Err(ClientError::Config(
                "invalid value for ping_timeout_ms: must be greater than 0".to_owned(),
            ));
        }
        config.ping_timeout = Duration::from_millis(u64::from(timeout_ms));

        config.consider_size_hints_maximized = parse_bool_flexible(
            values,
            "consider_size_hints_maximized",
            config.consider_size_hints_maximized,
        )?;
        config.ignore_activation_messages = parse_bool_flexible(
            values,
            "ignore_activation_messages",
            config.ignore_activation_messages,
        )?;

        if let Some(raw) = values.get("kill_signal") {
            config.kill_signal = KillSignal::parse(raw).ok_or_else(|| {
                ClientError::Config(format!(
                    "invalid value for kill_signal: {raw} (expected TERM, KILL, INT or HUP)"
                ))
            })?;
        }

        config.workspace_count = parse_u32(values, "workspace_count", config.workspace_count)?;
        if config.workspace_count == 0 {
            return Err(ClientError::Config(
                "invalid value for workspace_count: must be at least 1".to_owned(),
            ));
        }

        config.log_filter = values
            .get("log_filter")
            .map(|raw| raw.trim())
            .filter(|raw| !raw.is_empty())
            .map(str::to_owned);

        Ok(config)
    }
}

pub struct LoadedConfig {
    /// `None` when no config file exists and defaults are in effect.
    pub path: Option<PathBuf>,
    pub config: RuntimeConfig,
}

/// Loads `explicit`, or the default location. A missing default file is not
/// an error; a missing explicit one is.
pub fn load(explicit: Option<&Path>) -> Result<LoadedConfig, ClientError> {
    if let Some(path) = explicit {
        let config = load_from_path(path)?;
        return Ok(LoadedConfig {
            path: Some(path.to_owned()),
            config,
        });
    }

    let path = config_path()?;
    if !path.exists() {
        tracing::debug!(path = %path.display(), "no config file; using defaults");
        return Ok(LoadedConfig {
            path: None,
            config: RuntimeConfig::default(),
        });
    }
    let config = load_from_path(&path)?;
    Ok(LoadedConfig {
        path: Some(path),
        config,
    })
}

pub fn load_from_path(path: &Path) -> Result<RuntimeConfig, ClientError> {
    if !path.exists() {
        return Err(ClientError::Config(format!(
            "config file not found: {}",
            path.display()
        )));
    }
    let values = load_lua_values(path)?;
    RuntimeConfig::from_values(&values)
}

fn config_path() -> Result<PathBuf, ClientError> {
    if let Some(xdg) = std::env::var_os("XDG_CONFIG_HOME")
        && !xdg.is_empty()
    {
        return Ok(PathBuf::from(xdg).join("frame-client").join("config.lua"));
    }

    if let Some(home) = std::env::var_os("HOME")
        && !home.is_empty()
    {
        return Ok(PathBuf::from(home)
            .join(".config")
            .join("frame-client")
            .join("config.lua"));
    }

    Err(ClientError::Config(
        "unable to resolve config path: HOME and XDG_CONFIG_HOME are unset".to_owned(),
    ))
}

fn load_lua_values(path: &Path) -> Result<HashMap<String, String>, ClientError> {
    let output = Command::new("lua")
        .arg("-e")
        .arg(lua_loader_script())
        .env("FRAME_CLIENT_CONFIG_PATH", path)
        .output()
        .map_err(|err| ClientError::Config(format!("failed to execute lua: {err}")))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_owned();
        let reason = if stderr.is_empty() {
            "lua exited with non-zero status".to_owned()
        } else {
            stderr
        };
        return Err(ClientError::Config(format!(
            "failed to load {}: {reason}",
            path.display()
        )));
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    parse_key_value_stdout(&stdout)
}

fn parse_key_value_stdout(stdout: &str) -> Result<HashMap<String, String>, ClientError> {
    let mut values = HashMap::new();
    for line in stdout.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let Some((key, value)) = line.split_once('=') else {
            return Err(ClientError::Config(format!("invalid lua output line: {line}")));
        };
        values.insert(key.to_owned(), value.to_owned());
    }
    Ok(values)
}

fn parse_u32(
    values: &HashMap<String, String>,
    key: &str,
    default: u32,
) -> Result<u32, ClientError> {
    match values.get(key) {
        // Lua renders integral floats as `3000.0` on 5.3+.
        Some(raw) => raw
            .trim()
            .trim_end_matches(".0")
            .parse::<u32>()
            .map_err(|err| ClientError::Config(format!("invalid value for {key}: {raw} ({err})"))),
        None => Ok(default),
    }
}

fn parse_bool_flexible(
    values: &HashMap<String, String>,
    key: &str,
    default: bool,
) -> Result<bool, ClientError> {
    let Some(raw) = values.get(key) else {
        return Ok(default);
    };

    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        _ => Err(ClientError::Config(format!(
            "invalid value for {key}: {raw} (expected bool or 0/1)"
        ))),
    }
}

fn lua_loader_script() -> &'static str {
    r#"
local path = os.getenv("FRAME_CLIENT_CONFIG_PATH")
if type(path) ~= "string" or path == "" then
  io.stderr:write("FRAME_CLIENT_CONFIG_PATH is not set\n")
  os.exit(1)
end

local chunk, load_err = loadfile(path)
if not chunk then
  io.stderr:write(load_err .. "\n")
  os.exit(1)
end

local ok, result = pcall(chunk)
if not ok then
  io.stderr:write(result .. "\n")
  os.exit(1)
end

local cfg = nil
if type(result) == "table" then
  cfg = result
elseif type(_G.config) == "table" then
  cfg = _G.config
else
  cfg = {}
end

local function emit(key, value)
  io.write(key)
  io.write("=")
  io.write(tostring(value))
  io.write("\n")
end

local function emit_typed(name, value, expected)
  if value == nil then
    return
  end
  if type(value) ~= expected then
    io.stderr:write(name .. " must be a " .. expected .. "\n")
    os.exit(1)
  end
  emit(name, value)
end

local function emit_bool_like(name, value)
  if value == nil then
    return
  end
  if type(value) == "boolean" or type(value) == "number" then
    emit(name, value)
    return
  end
  io.stderr:write(name .. " must be a boolean or number\n")
  os.exit(1)
end

local function pick(primary, fallback)
  if primary ~= nil then
    return primary
  end
  return fallback
end

local ping = cfg.ping or {}
if type(ping) ~= "table" then
  io.stderr:write("ping must be a table\n")
  os.exit(1)
end

emit_typed("ping_timeout_ms", pick(cfg.ping_timeout_ms, ping.timeout_ms), "number")
emit_typed("kill_signal", pick(cfg.kill_signal, ping.kill_signal), "string")
emit_bool_like("consider_size_hints_maximized", cfg.consider_size_hints_maximized)
emit_typed("workspace_count", cfg.workspace_count, "number")
emit_bool_like("ignore_activation_messages", cfg.ignore_activation_messages)
emit_typed("log_filter", cfg.log_filter, "string")
"#
}

#[cfg(test)]
mod tests {
    use super::*;

    fn values(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(key, value)| ((*key).to_owned(), (*value).to_owned()))
            .collect()
    }

    #[test]
    fn empty_values_yield_defaults() {
        let config = RuntimeConfig::from_values(&HashMap::new());
        assert_eq!(config.ok(), Some(RuntimeConfig::default()));
        assert_eq!(RuntimeConfig::default().ping_timeout, Duration::from_millis(3000));
    }

    #[test]
    fn keys_are_parsed() {
        let config = RuntimeConfig::from_values(&values(&[
            ("ping_timeout_ms", "1500.0"),
            ("consider_size_hints_maximized", "yes"),
            ("kill_signal", "SIGKILL"),
            ("workspace_count", "9"),
            ("ignore_activation_messages", "1"),
            ("log_filter", " frame_client=trace "),
            ("unrelated", "x"),
        ]))
        .unwrap_or_else(|err| panic!("config rejected: {err}"));

        assert_eq!(config.ping_timeout, Duration::from_millis(1500));
        assert!(config.consider_size_hints_maximized);
        assert_eq!(config.kill_signal, KillSignal::Kill);
        assert_eq!(config.workspace_count, 9);
        assert!(config.ignore_activation_messages);
        assert_eq!(config.log_filter.as_deref(), Some("frame_client=trace"));

        let settings = config.client_settings();
        assert_eq!(settings.workspace_count, 9);
        assert!(settings.ignore_activation_messages);
    }

    #[test]
    fn invalid_values_are_rejected() {
        for pairs in [
            [("ping_timeout_ms", "0")],
            [("workspace_count", "0")],
            [("kill_signal", "STOP")],
            [("consider_size_hints_maximized", "maybe")],
        ] {
            assert!(
                matches!(RuntimeConfig::from_values(&values(&pairs)), Err(ClientError::Config(_))),
                "{pairs:?} accepted"
            );
        }
    }

    #[test]
    fn lua_output_lines_are_split_once() {
        let parsed = parse_key_value_stdout("log_filter=a=b\n\nworkspace_count=3\n");
        let parsed = parsed.unwrap_or_else(|err| panic!("{err}"));
        assert_eq!(parsed.get("log_filter").map(String::as_str), Some("a=b"));
        assert_eq!(parsed.get("workspace_count").map(String::as_str), Some("3"));
        assert!(parse_key_value_stdout("garbage").is_err());
    }
}

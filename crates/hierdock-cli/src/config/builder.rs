use super::defaults::DefaultsConfig;
use super::file::{FileConfig, FileSearchConfig};
use super::models::{AppConfig, Protocol, ProtocolFlags};
use crate::cli::SearchArgs;
use crate::error::{CliError, Result};
use hierdock::core::models::body::TrimDirection;
use hierdock::core::scoring::weights::Weights;
use hierdock::engine::config::SearchConfigBuilder;
use std::fmt::Display;
use std::str::FromStr;

/// Merges defaults, the configuration file, `--set` pairs and explicit flags, in increasing
/// order of precedence.
pub fn build_config(
    args: &SearchArgs,
    protocol: Protocol,
    flags: &ProtocolFlags,
) -> Result<AppConfig> {
    let defaults = DefaultsConfig::default();

    let file_config = if let Some(config_path) = &args.config {
        FileConfig::from_file(config_path)?
    } else {
        FileConfig::default()
    };

    let mut file_config = apply_set_values(file_config, &args.set_values)?;

    let search_file = file_config.search.take().unwrap_or_default();
    let output_file = file_config.output.take().unwrap_or_default();

    let weights = match file_config.weights.take() {
        Some(entries) => Weights::from_map(entries.iter().map(|(k, v)| (k.as_str(), *v)), &[])
            .map_err(|e| CliError::Config(e.to_string()))?,
        None => Weights::default(),
    };

    let trim_direction = match &args.trim_direction {
        Some(raw) => Some(
            raw.parse::<TrimDirection>()
                .map_err(|e| CliError::Argument(e.to_string()))?,
        ),
        None => search_file.trim_direction,
    };

    let mut builder = SearchConfigBuilder::new()
        .weights(weights)
        .plug_fixed_olig(flags.fixed_olig || search_file.plug_fixed_olig.unwrap_or(false))
        .nout_debug(
            args.nout_debug
                .or(output_file.nout_debug)
                .unwrap_or(defaults.nout_debug),
        )
        .nout_top(
            args.nout_top
                .or(output_file.nout_top)
                .unwrap_or(defaults.nout_top),
        )
        .output_prefix(
            args.output_prefix
                .clone()
                .or(output_file.prefix)
                .unwrap_or_else(|| defaults.prefix_for(protocol).to_string()),
        );

    if let Some(n) = args.beam_size.or(search_file.beam_size) {
        builder = builder.beam_size(n);
    }
    if let Some(n) = args.nresl.or(search_file.nresl) {
        builder = builder.nresl(n);
    }
    if let Some(n) = args.max_trim.or(search_file.max_trim) {
        builder = builder.max_trim(n);
    }
    if let Some(direction) = trim_direction {
        builder = builder.trim_direction(direction);
    }
    if let Some(n) = args.max_cluster.or(search_file.max_cluster) {
        builder = builder.max_cluster(n);
    }
    if let Some(d) = search_file.clash_dist {
        builder = builder.clash_dist(d);
    }
    if let Some(v) = search_file.max_longaxis_dot_z {
        builder = builder.max_longaxis_dot_z(v);
    }
    if let Some(method) = search_file.iface_summary {
        builder = builder.iface_summary(method);
    }
    if let Some(rms) = search_file.max_bb_redundancy {
        builder = builder.max_bb_redundancy(rms);
    }
    if let Some(filter) = search_file.score_only_ss {
        builder = builder.score_only_ss(filter);
    }
    if let Some(letters) = flags
        .trimmable_components
        .as_deref()
        .or(search_file.trimmable_components.as_deref())
    {
        builder = builder.trimmable_components(letters);
    }
    if let Some(h) = flags.max_delta_h.or(search_file.max_delta_h) {
        builder = builder.max_delta_h(h);
    }

    let search = builder
        .build()
        .map_err(|e| CliError::Config(e.to_string()))?;

    Ok(AppConfig {
        score_path: args.score.clone(),
        result_path: args.output.clone(),
        csv_path: args.csv.clone(),
        search,
    })
}

fn parse_value<T>(key: &str, value: &str) -> Result<T>
where
    T: FromStr,
    T::Err: Display,
{
    value
        .trim()
        .parse()
        .map_err(|e| CliError::Config(format!("Invalid value for {}: {} ({})", key, value, e)))
}

fn apply_set_values(mut config: FileConfig, set_values: &[String]) -> Result<FileConfig> {
    if set_values.is_empty() {
        return Ok(config);
    }
    for kv_pair in set_values {
        let Some((key, value_str)) = kv_pair.split_once('=') else {
            return Err(CliError::Config(format!(
                "Invalid --set format: '{}'. Expected KEY=VALUE.",
                kv_pair
            )));
        };
        let key = key.trim();

        if let Some(name) = key.strip_prefix("weights.") {
            let value = parse_value(key, value_str)?;
            config
                .weights
                .get_or_insert_with(Default::default)
                .insert(name.to_string(), value);
            continue;
        }

        match key {
            "search.beam-size" => {
                config.search.get_or_insert_with(FileSearchConfig::default).beam_size =
                    Some(parse_value(key, value_str)?);
            }
            "search.nresl" => {
                config.search.get_or_insert_with(FileSearchConfig::default).nresl =
                    Some(parse_value(key, value_str)?);
            }
            "search.clash-dist" => {
                config.search.get_or_insert_with(FileSearchConfig::default).clash_dist =
                    Some(parse_value(key, value_str)?);
            }
            "search.max-trim" => {
                config.search.get_or_insert_with(FileSearchConfig::default).max_trim =
                    Some(parse_value(key, value_str)?);
            }
            "search.trim-direction" => {
                config.search.get_or_insert_with(FileSearchConfig::default).trim_direction =
                    Some(parse_value(key, value_str)?);
            }
            "search.max-longaxis-dot-z" => {
                config.search.get_or_insert_with(FileSearchConfig::default).max_longaxis_dot_z =
                    Some(parse_value(key, value_str)?);
            }
            "search.iface-summary" => {
                config.search.get_or_insert_with(FileSearchConfig::default).iface_summary =
                    Some(parse_value(key, value_str)?);
            }
            "search.max-bb-redundancy" => {
                config.search.get_or_insert_with(FileSearchConfig::default).max_bb_redundancy =
                    Some(parse_value(key, value_str)?);
            }
            "search.max-cluster" => {
                config.search.get_or_insert_with(FileSearchConfig::default).max_cluster =
                    Some(parse_value(key, value_str)?);
            }
            "search.score-only-ss" => {
                config.search.get_or_insert_with(FileSearchConfig::default).score_only_ss =
                    Some(parse_value(key, value_str)?);
            }
            "search.plug-fixed-olig" => {
                config.search.get_or_insert_with(FileSearchConfig::default).plug_fixed_olig =
                    Some(parse_value(key, value_str)?);
            }
            "search.trimmable-components" => {
                config
                    .search
                    .get_or_insert_with(FileSearchConfig::default)
                    .trimmable_components = Some(value_str.trim().to_string());
            }
            "search.max-delta-h" => {
                config.search.get_or_insert_with(FileSearchConfig::default).max_delta_h =
                    Some(parse_value(key, value_str)?);
            }
            "output.nout-top" => {
                config.output.get_or_insert_with(Default::default).nout_top =
                    Some(parse_value(key, value_str)?);
            }
            "output.nout-debug" => {
                config.output.get_or_insert_with(Default::default).nout_debug =
                    Some(parse_value(key, value_str)?);
            }
            "output.prefix" => {
                config.output.get_or_insert_with(Default::default).prefix =
                    Some(value_str.trim().to_string());
            }
            _ => {
                return Err(CliError::Config(format!(
                    "Unsupported configuration key for --set: '{}'",
                    key
                )));
            }
        }
    }
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use hierdock::core::scoring::summary::SummaryMethod;
    use hierdock::engine::config::SearchConfig;
    use std::fs;
    use std::path::PathBuf;
    use tempfile::tempdir;

    const NO_FLAGS: ProtocolFlags = ProtocolFlags {
        fixed_olig: false,
        trimmable_components: None,
        max_delta_h: None,
    };

    fn base_args() -> SearchArgs {
        SearchArgs {
            score: PathBuf::from("score.toml"),
            output: PathBuf::from("out.toml"),
            ..Default::default()
        }
    }

    #[test]
    fn defaults_fill_everything_not_given() {
        let app = build_config(&base_args(), Protocol::Cyclic, &NO_FLAGS).unwrap();
        let cfg = app.search;
        let core = SearchConfig::default();

        assert_eq!(app.score_path, PathBuf::from("score.toml"));
        assert_eq!(app.result_path, PathBuf::from("out.toml"));
        assert!(app.csv_path.is_none());
        assert_eq!(cfg.beam_size, core.beam_size);
        assert_eq!(cfg.max_trim, core.max_trim);
        assert_eq!(cfg.weights, Weights::default());
        assert_eq!(cfg.output_prefix, "cyclic");
        assert_eq!(cfg.nout_debug, DefaultsConfig::default().nout_debug);
        assert!(!cfg.plug_fixed_olig);
    }

    #[test]
    fn file_values_are_merged() {
        let dir = tempdir().unwrap();
        let cfg_path = dir.path().join("config.toml");
        fs::write(
            &cfg_path,
            r#"
            [search]
            beam-size = 6400
            clash-dist = 3.0
            trim-direction = "N"
            iface-summary = "sum"
            plug-fixed-olig = true

            [weights]
            ncontact = 0.1

            [output]
            nout-debug = 4
            "#,
        )
        .unwrap();

        let mut args = base_args();
        args.config = Some(cfg_path);
        let cfg = build_config(&args, Protocol::Plug, &NO_FLAGS).unwrap().search;

        assert_eq!(cfg.beam_size, 6400);
        assert_eq!(cfg.clash_dist, 3.0);
        assert_eq!(cfg.trim_direction, TrimDirection::N);
        assert_eq!(cfg.iface_summary, SummaryMethod::Sum);
        assert!(cfg.plug_fixed_olig);
        assert_eq!(cfg.weights.ncontact, 0.1);
        assert_eq!(cfg.weights.rpx, Weights::default().rpx);
        assert_eq!(cfg.nout_debug, 4);
        assert_eq!(cfg.output_prefix, "plug");
    }

    #[test]
    fn cli_flags_override_file_and_set_values() {
        let dir = tempdir().unwrap();
        let cfg_path = dir.path().join("config.toml");
        fs::write(&cfg_path, "[search]\nbeam-size = 6400\nmax-trim = 5\n").unwrap();

        let mut args = base_args();
        args.config = Some(cfg_path);
        args.set_values = vec!["search.beam-size=12800".to_string()];
        args.max_trim = Some(2);
        args.trim_direction = Some("c".to_string());
        args.output_prefix = Some("run".to_string());
        let fixed = ProtocolFlags {
            fixed_olig: true,
            ..Default::default()
        };

        let cfg = build_config(&args, Protocol::Plug, &fixed).unwrap().search;
        assert_eq!(cfg.beam_size, 12800);
        assert_eq!(cfg.max_trim, 2);
        assert_eq!(cfg.trim_direction, TrimDirection::C);
        assert_eq!(cfg.output_prefix, "run");
        assert!(cfg.plug_fixed_olig);
    }

    #[test]
    fn set_values_cover_weights_and_output() {
        let mut args = base_args();
        args.set_values = vec![
            "weights.plug=2.5".to_string(),
            "search.max-bb-redundancy=1.5".to_string(),
            "search.score-only-ss=EH".to_string(),
            "output.prefix=dbg".to_string(),
            "output.nout-debug=2".to_string(),
        ];
        let cfg = build_config(&args, Protocol::Plug, &NO_FLAGS).unwrap().search;
        assert_eq!(cfg.weights.plug, 2.5);
        assert_eq!(cfg.max_bb_redundancy, 1.5);
        assert_eq!(cfg.score_only_ss.to_string(), "EH");
        assert_eq!(cfg.output_prefix, "dbg");
        assert_eq!(cfg.nout_debug, 2);
    }

    #[test]
    fn cage_options_come_from_file_set_values_and_flags() {
        let mut args = base_args();
        args.set_values = vec![
            "search.trimmable-components=ab".to_string(),
            "search.max-delta-h=6".to_string(),
            "output.nout-top=3".to_string(),
        ];
        let app = build_config(&args, Protocol::Cage, &NO_FLAGS).unwrap();
        assert_eq!(app.search.trimmable_components, "AB");
        assert_eq!(app.search.max_delta_h, 6.0);
        assert_eq!(app.search.nout_top, 3);
        assert_eq!(app.search.output_prefix, "cage");

        let flags = ProtocolFlags {
            trimmable_components: Some("C".to_string()),
            max_delta_h: Some(2.0),
            ..Default::default()
        };
        args.nout_top = Some(9);
        let cfg = build_config(&args, Protocol::Cage, &flags).unwrap().search;
        assert_eq!(cfg.trimmable_components, "C");
        assert_eq!(cfg.max_delta_h, 2.0);
        assert_eq!(cfg.nout_top, 9);

        args.set_values = vec!["search.trimmable-components=A-B".to_string()];
        let err = build_config(&args, Protocol::Cage, &NO_FLAGS).unwrap_err();
        assert!(matches!(err, CliError::Config(msg) if msg.contains("trimmable_components")));
    }

    #[test]
    fn malformed_set_values_are_rejected() {
        for bad in [
            "search.beam-size",
            "search.beam-size=many",
            "search.unknown=1",
            "search.iface-summary=mode",
        ] {
            let mut args = base_args();
            args.set_values = vec![bad.to_string()];
            let err = build_config(&args, Protocol::Cyclic, &NO_FLAGS).unwrap_err();
            assert!(matches!(err, CliError::Config(_)), "{bad}: {err:?}");
        }
    }

    #[test]
    fn unknown_weight_key_is_a_config_error() {
        let mut args = base_args();
        args.set_values = vec!["weights.hbond=1.0".to_string()];
        let err = build_config(&args, Protocol::Cyclic, &NO_FLAGS).unwrap_err();
        assert!(matches!(err, CliError::Config(msg) if msg.contains("hbond")));
    }

    #[test]
    fn invalid_search_values_fail_validation() {
        let mut args = base_args();
        args.beam_size = Some(10);
        let err = build_config(&args, Protocol::Cyclic, &NO_FLAGS).unwrap_err();
        assert!(matches!(err, CliError::Config(msg) if msg.contains("beam_size")));

        let mut args = base_args();
        args.trim_direction = Some("middle".to_string());
        let err = build_config(&args, Protocol::Cyclic, &NO_FLAGS).unwrap_err();
        assert!(matches!(err, CliError::Argument(_)));
    }
}

use anyhow::Result;
use std::ffi::OsString;
use std::path::PathBuf;

use crate::util::config::ViewerConfig;

pub const DEFAULT_REPORT_TICKS: usize = 300;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CliArgs {
    pub graph: Option<PathBuf>,
    pub projection: Option<PathBuf>,
    /// Replaces the configured seed list when non-empty.
    pub seeds: Vec<String>,
    pub headless: bool,
    pub ticks: Option<usize>,
}

impl CliArgs {
    pub fn apply(&self, cfg: &mut ViewerConfig) {
        if let Some(path) = &self.graph {
            cfg.graph_path = path.clone();
        }
        if let Some(path) = &self.projection {
            cfg.projection_path = path.clone();
        }
        if !self.seeds.is_empty() {
            cfg.seeds = self.seeds.clone();
        }
    }

    pub fn report_ticks(&self) -> usize {
        self.ticks.unwrap_or(DEFAULT_REPORT_TICKS)
    }
}

pub fn parse_args() -> Result<CliArgs> {
    parse_args_from(std::env::args_os().skip(1))
}

fn parse_args_from<I>(args: I) -> Result<CliArgs>
where
    I: IntoIterator<Item = OsString>,
{
    let mut out = CliArgs::default();
    let mut args = args.into_iter();

    while let Some(arg) = args.next() {
        if arg == "--graph" {
            let Some(path) = args.next() else {
                anyhow::bail!("--graph expects a path");
            };
            out.graph = Some(PathBuf::from(path));
        } else if arg == "--projection" {
            let Some(path) = args.next() else {
                anyhow::bail!("--projection expects a path");
            };
            out.projection = Some(PathBuf::from(path));
        } else if arg == "--seed" {
            let Some(id) = args.next() else {
                anyhow::bail!("--seed expects an entity identifier");
            };
            out.seeds.push(id.to_string_lossy().into_owned());
        } else if arg == "--headless" {
            out.headless = true;
        } else if arg == "--ticks" {
            let Some(value) = args.next() else {
                anyhow::bail!("--ticks expects a number");
            };
            let value = value.to_string_lossy();
            let Ok(n) = value.parse::<usize>() else {
                anyhow::bail!("invalid tick count: {value}");
            };
            out.ticks = Some(n);
        } else {
            anyhow::bail!("unknown argument: {:?}", arg);
        }
    }

    Ok(out)
}

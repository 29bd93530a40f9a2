use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::env;
use std::fs;
use std::io;
use std::path::PathBuf;

use debplan::{due_to, error, info, Fetcher, Operation, PackageIndex, ResolverConfig, WRITER};

#[derive(Deserialize)]
struct Config {
    packages_file: PathBuf,
    installed_file: Option<PathBuf>,
    #[serde(default)]
    repo: ResolverConfig,
}

fn main() {
    if let Err(err) = try_main() {
        error!("{}", err);
        err.chain().skip(1).for_each(|cause| {
            due_to!("{}", cause);
        });
        std::process::exit(1);
    }
}

fn try_main() -> Result<()> {
    let mut args = env::args().skip(1);
    let config_path = match args.next() {
        Some(path) => PathBuf::from(path),
        None => bail!(
            "usage: debplan <config.toml> <calculate-deps|bootstrap-sequence|all-priority|package-url> [argument]"
        ),
    };

    let data = fs::read_to_string(&config_path).context("Failed to read config file")?;
    let config: Config = toml::from_str(&data).context("Failed to parse config file")?;

    let packages = PackageIndex::from_path(&config.packages_file)
        .context("Failed to read the Packages index")?;
    info!("Read {} packages.", packages.len());

    let installed = match &config.installed_file {
        Some(path) => {
            PackageIndex::from_path(path).context("Failed to read the installed index")?
        }
        None => PackageIndex::new(),
    };

    let command = args.next().unwrap_or_default();
    match command.as_str() {
        "calculate-deps" => {
            let target = require_arg(args.next(), "calculate-deps <package-name>")?;
            let graph = packages.install_graph(&target, &installed)?;
            graph.pretty_write(&mut io::stdout(), 0)?;
        }

        "bootstrap-sequence" => {
            let target = require_arg(args.next(), "bootstrap-sequence <package-name>")?;
            let graph = packages.install_graph(&target, &installed)?;
            for (i, op) in graph.unroll().into_iter().enumerate() {
                if let Operation::Install {
                    package,
                    version,
                    pre_dep,
                } = op
                {
                    let marker = if *pre_dep { "[*]" } else { "[ ]" };
                    println!("{:03} {} {} {}", i, marker, package, version);
                }
            }
        }

        "all-priority" => {
            let priority = require_arg(args.next(), "all-priority <priority|essential>")?;
            let mut names = if priority == "essential" {
                packages.get_all_essential()
            } else {
                packages.get_all_by_priority(&priority)
            };
            names.sort_unstable();
            WRITER.write_chunks("PACKAGES", &names)?;
        }

        "package-url" => {
            let target = require_arg(args.next(), "package-url <package-name>")?;
            let version = packages.find_latest(&target)?.version()?;
            let fetcher = Fetcher::new(&config.repo, &packages);
            println!("{}", fetcher.package_url(&target, &version)?);
        }

        other => bail!(
            "unknown command {:?} (available: calculate-deps, bootstrap-sequence, all-priority, package-url)",
            other
        ),
    }

    Ok(())
}

fn require_arg(arg: Option<String>, usage: &str) -> Result<String> {
    match arg {
        Some(arg) => Ok(arg),
        None => bail!("usage: debplan <config.toml> {}", usage),
    }
}

// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Folio and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Folio demo entrypoint.
//!
//! Opens a reader URL against the built-in sample library, clicks the first segment,
//! follows a connection and walks back through history, printing each entry.
//! Set `RUST_LOG=folio=debug` to watch the session work.

use std::error::Error;
use std::path::PathBuf;
use std::sync::Arc;

use folio::config::ReaderConfig;
use folio::driver::Driver;
use folio::history::{MemoryHistory, NavigableHistory};
use folio::library::MemoryLibrary;
use folio::model::Ref;
use folio::session::{Intent, SessionController};
use folio::store::BootstrapParams;

const DEFAULT_URL: &str = "/Genesis.1";

fn print_usage(program: &str) {
    eprintln!("Usage:\n  {program} [--config <file>] [--multi-panel] [<url>]\n");
    eprintln!("<url> defaults to {DEFAULT_URL}.");
    eprintln!("--config reads a JSON reader config; --multi-panel overrides its layout.");
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
struct CliOptions {
    config: Option<PathBuf>,
    multi_panel: bool,
    url: Option<String>,
}

fn parse_options(mut args: impl Iterator<Item = String>) -> Result<CliOptions, ()> {
    let mut options = CliOptions::default();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--config" => {
                if options.config.is_some() {
                    return Err(());
                }
                let path = args.next().ok_or(())?;
                options.config = Some(PathBuf::from(path));
            }
            "--multi-panel" => {
                if options.multi_panel {
                    return Err(());
                }
                options.multi_panel = true;
            }
            _ if arg.starts_with('-') => return Err(()),
            _ => {
                if options.url.is_some() {
                    return Err(());
                }
                options.url = Some(arg);
            }
        }
    }

    Ok(options)
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("folio=info"));
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();
}

fn print_entry(label: &str, history: &MemoryHistory) {
    match history.current() {
        Some(snapshot) => println!("{label:>8}  {}  ({})", snapshot.url, snapshot.title),
        None => println!("{label:>8}  <empty>"),
    }
}

async fn demo(options: CliOptions, config: ReaderConfig) -> Result<(), Box<dyn Error>> {
    let url = options.url.as_deref().unwrap_or(DEFAULT_URL);
    let params = BootstrapParams::from_url(url, config.multi_panel, &config.url_prefix)?;
    let session = SessionController::bootstrap(&params, &config, MemoryHistory::new());
    let mut driver = Driver::new(session, Arc::new(MemoryLibrary::sample()));

    driver.start();
    driver.settle().await;
    print_entry("open", driver.session().history());

    let Some(panel) = driver.session().panels().first().cloned() else {
        return Ok(());
    };
    let Some(section) = panel.last_ref().map(Ref::section_ref) else {
        return Ok(());
    };
    let Ok(first_segment) = Ref::new(format!("{}:1", section.as_str())) else {
        println!("{section} has no segments to click");
        return Ok(());
    };
    driver.dispatch(Intent::SegmentClicked {
        panel: panel.id,
        reference: first_segment,
    });
    driver.settle().await;
    print_entry("click", driver.session().history());

    let connections = driver.session().panels().last().map(|panel| panel.id);
    let target = connections.and_then(|id| {
        let links = driver.session().visible_links(id);
        links.first().map(|link| link.source_ref.clone())
    });
    if let (Some(id), Some(target)) = (connections, target) {
        driver.dispatch(Intent::ConnectionClicked {
            panel: id,
            reference: target,
        });
        driver.settle().await;
        print_entry("follow", driver.session().history());
    }

    while let Some(snapshot) = driver.session_mut().history_mut().back() {
        driver.dispatch(Intent::HistoryPopped(Box::new(snapshot)));
        driver.settle().await;
        print_entry("back", driver.session().history());
    }

    println!("{} history entries", driver.session().history().len());
    Ok(())
}

fn main() {
    let result = (|| -> Result<(), Box<dyn Error>> {
        let mut args = std::env::args();
        let program = args.next().unwrap_or_else(|| "folio".to_owned());

        let options = match parse_options(args) {
            Ok(options) => options,
            Err(()) => {
                print_usage(&program);
                std::process::exit(2);
            }
        };

        init_tracing();

        let mut config = match &options.config {
            Some(path) => ReaderConfig::load(path)?,
            None => ReaderConfig::default(),
        };
        if options.multi_panel {
            config.multi_panel = true;
        }

        let runtime = tokio::runtime::Builder::new_current_thread().enable_all().build()?;
        runtime.block_on(demo(options, config))
    })();

    if let Err(err) = result {
        eprintln!("{err}");
        std::process::exit(1);
    }
}

//! studyflow init command implementation
//!
//! Creates the data directory, its store directory, and a default config.

use std::path::{Path, PathBuf};

use crate::config::{Config, CONFIG_FILE};
use crate::error::Result;
use crate::kv::STORE_DIR;
use crate::output::{emit_success, HumanOutput, OutputOptions};

pub struct InitOptions {
    pub data_dir: PathBuf,
    pub json: bool,
    pub quiet: bool,
}

#[derive(serde::Serialize)]
struct InitReport {
    data_dir: PathBuf,
    created: InitCreated,
}

#[derive(serde::Serialize)]
struct InitCreated {
    data_dir: bool,
    store: bool,
    config: bool,
}

pub fn run(options: InitOptions) -> Result<()> {
    let data_dir = options.data_dir;

    let created_data_dir = ensure_dir(&data_dir)?;
    let created_store = ensure_dir(&data_dir.join(STORE_DIR))?;
    let created_config = ensure_config(&data_dir)?;

    let report = InitReport {
        data_dir: data_dir.clone(),
        created: InitCreated {
            data_dir: created_data_dir,
            store: created_store,
            config: created_config,
        },
    };

    let mut created_items = Vec::new();
    if created_store {
        created_items.push(format!("{STORE_DIR}/"));
    }
    if created_config {
        created_items.push(CONFIG_FILE.to_string());
    }

    let header = if created_items.is_empty() {
        "studyflow init: nothing to do".to_string()
    } else {
        "studyflow init: initialized data directory".to_string()
    };

    let mut human = HumanOutput::new(header);
    human.push_summary("data dir", data_dir.display().to_string());
    human.push_summary(
        "created",
        if created_items.is_empty() {
            "none".to_string()
        } else {
            created_items.join(", ")
        },
    );
    human.push_next_step("studyflow task add \"<title>\"");
    human.push_next_step("studyflow timer start");

    emit_success(
        OutputOptions {
            json: options.json,
            quiet: options.quiet,
        },
        "init",
        &report,
        Some(&human),
    )
}

fn ensure_dir(path: &Path) -> Result<bool> {
    if path.is_dir() {
        return Ok(false);
    }
    std::fs::create_dir_all(path)?;
    Ok(true)
}

fn ensure_config(data_dir: &Path) -> Result<bool> {
    let path = data_dir.join(CONFIG_FILE);
    if path.exists() {
        // An existing file must still parse
        Config::load(&path)?;
        return Ok(false);
    }
    Config::default().save(&path)?;
    tracing::debug!(path = %path.display(), "wrote default config");
    Ok(true)
}

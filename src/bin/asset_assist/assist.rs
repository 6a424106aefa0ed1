use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::{Context, Result};
use colored::Colorize;
use walkdir::WalkDir;

use asset_assistant::assets::file_ops::unique_path;
use asset_assistant::assets::{AssetPipeline, ConsoleReporter, FsFileOperations, ImageDimensionProbe};
use asset_assistant::{print_bold, print_error, print_warning};

use crate::AssistArgs;
use crate::config::Config;
use crate::logger::FileLogger;

/// Staging area orchestrator: prepares the staging directory and feeds files to the pipeline.
#[derive(Debug)]
pub struct AssetAssist {
    config: Config,
}

impl AssetAssist {
    pub fn new(args: AssistArgs) -> Result<Self> {
        let config = Config::from_args(args)?;
        if config.debug {
            println!("{config}");
        }
        Ok(Self { config })
    }

    pub fn run(&self) -> Result<()> {
        let settings = &self.config.settings;
        for warning in settings.validate()? {
            print_warning!("{warning}");
        }

        if !settings.dryrun {
            self.bootstrap()?;
            if self.config.flatten {
                self.flatten_staging();
            }
        }

        let files = self.collect_staged_files()?;
        if files.is_empty() {
            println!("No assets found in {}", settings.staging.display());
            return Ok(());
        }

        print_bold!(
            "Processing {} asset{}{}",
            files.len(),
            if files.len() == 1 { "" } else { "s" },
            if settings.dryrun { " (dryrun)" } else { "" }
        );

        let mut logger = if self.config.log {
            let mut logger = FileLogger::new(self.config.log_dir.as_deref())?;
            logger.log_init(&self.config);
            if settings.verbose {
                println!("Logging to {}", logger.path().display());
            }
            Some(logger)
        } else {
            None
        };

        let abort_flag = Arc::new(AtomicBool::new(false));
        let abort_flag_handler = Arc::clone(&abort_flag);
        ctrlc::set_handler(move || {
            if abort_flag_handler.load(Ordering::SeqCst) {
                // Second Ctrl+C - force exit
                std::process::exit(130);
            }
            println!("\n{}", "Received Ctrl+C, finishing current asset...".yellow().bold());
            abort_flag_handler.store(true, Ordering::SeqCst);
        })
        .context("Failed to set Ctrl+C handler")?;

        let sink = (ConsoleReporter::new(settings.verbose), logger.as_mut());
        let mut pipeline = AssetPipeline::new(settings.clone(), FsFileOperations, ImageDimensionProbe, sink);

        let mut aborted = false;
        for file in &files {
            if abort_flag.load(Ordering::SeqCst) {
                aborted = true;
                break;
            }
            if !file.is_file() {
                print_warning!("Skipping missing file: {}", file.display());
                continue;
            }
            pipeline.process(file);
        }

        if aborted {
            println!("\n{}", "Aborted by user".bold().red());
        }
        pipeline.finish();

        if aborted && let Some(logger) = logger.as_mut() {
            logger.log_abort();
        }

        Ok(())
    }

    /// Create the failed and backup directories.
    fn bootstrap(&self) -> Result<()> {
        let settings = &self.config.settings;
        fs::create_dir_all(&settings.failed)
            .with_context(|| format!("Failed to create failed directory: {}", settings.failed.display()))?;
        if settings.backup_source || settings.backup_destination {
            fs::create_dir_all(&settings.backup)
                .with_context(|| format!("Failed to create backup directory: {}", settings.backup.display()))?;
        }
        Ok(())
    }

    /// Move image files from staging subdirectories to the staging root and remove emptied directories.
    fn flatten_staging(&self) {
        let settings = &self.config.settings;
        let staging = &settings.staging;

        let nested: Vec<PathBuf> = WalkDir::new(staging)
            .min_depth(2)
            .into_iter()
            .filter_entry(|entry| entry.depth() == 0 || self.is_flattenable(entry))
            .filter_map(Result::ok)
            .filter(|entry| entry.file_type().is_file())
            .map(walkdir::DirEntry::into_path)
            .filter(|path| settings.accepts_extension(&asset_assistant::path_to_file_extension_string(path)))
            .collect();

        for path in nested {
            let target = unique_path(&staging.join(asset_assistant::path_to_filename_string(&path)));
            match fs::rename(&path, &target) {
                Ok(()) => {
                    if settings.verbose {
                        println!("Flattened: {}", target.display());
                    }
                }
                Err(e) => print_error!("Failed to move {}: {e}", path.display()),
            }
        }

        let directories: Vec<PathBuf> = WalkDir::new(staging)
            .min_depth(1)
            .contents_first(true)
            .into_iter()
            .filter_entry(|entry| entry.depth() == 0 || self.is_flattenable(entry))
            .filter_map(Result::ok)
            .filter(|entry| entry.file_type().is_dir())
            .map(walkdir::DirEntry::into_path)
            .collect();

        for directory in directories {
            if asset_assistant::is_directory_empty(&directory)
                && let Err(e) = fs::remove_dir(&directory)
            {
                print_error!("Failed to remove directory {}: {e}", directory.display());
            }
        }
    }

    /// Snapshot of staged files, sorted for a stable processing order.
    fn collect_staged_files(&self) -> Result<Vec<PathBuf>> {
        let staging = &self.config.settings.staging;
        let mut files = Vec::new();
        for entry in fs::read_dir(staging)
            .with_context(|| format!("Failed to read staging directory: {}", staging.display()))?
        {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            if entry.file_name().as_encoded_bytes().first() == Some(&b'.') {
                continue;
            }
            files.push(entry.path());
        }
        files.sort();
        Ok(files)
    }

    /// Hidden entries and the failed and backup directories inside staging are left alone.
    fn is_flattenable(&self, entry: &walkdir::DirEntry) -> bool {
        let settings = &self.config.settings;
        let path = entry.path();
        !asset_assistant::is_hidden(entry) && path != settings.failed && path != settings.backup
    }
}

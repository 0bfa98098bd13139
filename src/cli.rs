use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::drive::DriveClient;
use crate::drive::operations::{TransferOptions, TransferReport};
use crate::drive::utils::OutputFormat;
use crate::drive::utils::size::format_size;
use crate::error::Result;

#[derive(Parser, Debug)]
#[command(name = "drivectl")]
#[command(about = "Download, upload and create folders in Google Drive")]
#[command(version)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,
}

/// Type and extension filters shared by transfers.
#[derive(clap::Args, Debug, Clone, Default)]
pub struct FilterArgs {
    /// Only transfer files with these MIME types
    #[arg(long = "mime-types", num_args = 1.., value_delimiter = ',')]
    pub mime_types: Vec<String>,

    /// Only transfer files with these extensions (e.g. .pdf or pdf)
    #[arg(long = "file-extensions", num_args = 1.., value_delimiter = ',')]
    pub file_extensions: Vec<String>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Download a file or the contents of a folder
    Download {
        /// ID of the file or folder to download
        item_id: String,

        /// Local directory receiving the files
        #[arg(default_value = ".")]
        local_path: PathBuf,

        /// Descend into subfolders
        #[arg(short = 'R', long)]
        recursive: bool,

        /// Overwrite files that already exist locally
        #[arg(short = 'f', long)]
        overwrite: bool,

        /// Keep the content in memory and print a summary instead of writing files
        #[arg(long)]
        return_object: bool,

        #[command(flatten)]
        filters: FilterArgs,

        /// Print the transfer report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Upload a file or directory into a folder
    Upload {
        /// ID of the destination folder
        folder_id: String,

        /// File or directory to upload
        local_path: PathBuf,

        /// Create a folder named after the directory before uploading into it
        #[arg(long)]
        create_folder: bool,

        /// Upload subdirectories too
        #[arg(short = 'R', long)]
        recursive: bool,

        /// Replace files that already exist in the folder
        #[arg(short = 'f', long)]
        overwrite: bool,

        #[command(flatten)]
        filters: FilterArgs,
    },

    /// Create a folder
    Mkdir {
        /// Name of the new folder
        name: String,

        /// ID of the parent folder
        parent_id: String,
    },
}

impl FilterArgs {
    fn apply(&self, options: TransferOptions) -> TransferOptions {
        options
            .with_mime_types(&self.mime_types)
            .with_extensions(&self.file_extensions)
    }
}

pub async fn run(args: Args, client: DriveClient) -> Result<()> {
    match args.command {
        Command::Download {
            item_id,
            local_path,
            recursive,
            overwrite,
            return_object,
            filters,
            json,
        } => {
            let options = filters.apply(TransferOptions {
                recursive,
                overwrite,
                return_content: return_object,
                ..TransferOptions::default()
            });
            let format = if json {
                OutputFormat::Json
            } else {
                OutputFormat::Human
            };
            let report = client.download(&item_id, &local_path, &options).await?;
            print_report(&report, "Downloaded", format, return_object)?;
            report.ensure_complete()
        }
        Command::Upload {
            folder_id,
            local_path,
            create_folder,
            recursive,
            overwrite,
            filters,
        } => {
            let options = filters.apply(TransferOptions {
                recursive,
                overwrite,
                ..TransferOptions::default()
            });
            let report = client
                .upload(&folder_id, &local_path, create_folder, &options)
                .await?;
            print_report(&report, "Uploaded", OutputFormat::Human, false)?;
            report.ensure_complete()
        }
        Command::Mkdir { name, parent_id } => {
            client.create_folder(&name, &parent_id).await?;
            Ok(())
        }
    }
}

fn print_report(
    report: &TransferReport,
    verb: &str,
    format: OutputFormat,
    list_items: bool,
) -> Result<()> {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(report)?);
        }
        OutputFormat::Human => {
            if list_items {
                for item in &report.transferred {
                    println!("{}\t{}\t{}", item.name, item.mime_type, format_size(item.size));
                }
            }
            println!(
                "{verb} {} item(s) ({}), skipped {}, failed {}",
                report.transferred.len(),
                format_size(report.total_bytes()),
                report.skipped.len(),
                report.failed.len()
            );
        }
    }
    Ok(())
}

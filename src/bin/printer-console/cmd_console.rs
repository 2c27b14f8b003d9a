use std::path::PathBuf;

use anyhow::Result;
use printer_console::{Backend, Controller, UploadFile};
use tokio::io::{AsyncBufReadExt, BufReader};

const HELP: &str = "\
commands:
  refresh            reload the file list
  select <name>      select a file
  upload <path>      upload a file
  print              print the selected file
  delete             delete the selected file
  ip                 show the printer address
  edit-ip            unlock the printer address
  save-ip <address>  store a new printer address
  quit";

/// Read commands from stdin until it closes or the operator quits. Uploads
/// and prints run in the background so the console stays responsive.
pub async fn main<B: Backend>(controller: &Controller<B>) -> Result<()> {
    let _ = controller.refresh_catalog().await;
    let _ = controller.load_address().await;
    println!("{}", HELP);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let (command, argument) = match line.trim().split_once(char::is_whitespace) {
            Some((command, argument)) => (command, argument.trim()),
            None => (line.trim(), ""),
        };

        match (command, argument) {
            ("", _) => continue,
            ("quit" | "exit", _) => break,
            ("help", _) => println!("{}", HELP),
            ("refresh", _) => {
                let _ = controller.refresh_catalog().await;
            }
            ("select", name) if !name.is_empty() => controller.select_file(name).await,
            ("upload", path) if !path.is_empty() => {
                let file = match UploadFile::from_path(&PathBuf::from(path)).await {
                    Ok(file) => file,
                    Err(e) => {
                        println!("cannot read {}: {}", path, e);
                        continue;
                    }
                };
                let controller = controller.clone();
                tokio::spawn(async move {
                    if let Err(e) = controller.upload(file).await {
                        tracing::debug!(error = format!("{:?}", e), "upload ended in failure");
                    }
                });
            }
            ("print", _) => {
                let controller = controller.clone();
                tokio::spawn(async move {
                    if let Err(e) = controller.print_selected().await {
                        tracing::debug!(error = format!("{:?}", e), "print ended in failure");
                    }
                });
            }
            ("delete", _) => {
                let _ = controller.delete_selected().await;
            }
            ("ip", _) => {
                if let Err(e) = controller.load_address().await {
                    println!("{}", e);
                }
            }
            ("edit-ip", _) => controller.edit_address().await,
            ("save-ip", address) => {
                if let Err(e) = controller.save_address(address).await {
                    println!("{}", e);
                }
            }
            _ => println!("unknown command, try `help`"),
        }
    }

    Ok(())
}

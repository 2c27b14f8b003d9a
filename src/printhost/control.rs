use ::printhost::{FileInfo, PrintStatus};
use tokio::sync::mpsc;

use super::Client;
use crate::{
    AddressStore, CatalogEntry, DeviceStatus, DeviceStatusSource, FileCatalog, PrintControl, ProgressSink, Result,
    UploadFile,
};

impl From<FileInfo> for CatalogEntry {
    fn from(file: FileInfo) -> Self {
        CatalogEntry {
            name: file.name,
            size_mb: file.size,
        }
    }
}

impl From<PrintStatus> for DeviceStatus {
    fn from(status: PrintStatus) -> Self {
        DeviceStatus {
            status: status.status,
            progress: status.progress,
            online: status.is_online,
            current_layer: status.current_layer,
            total_layers: status.total_layers,
        }
    }
}

impl AddressStore for Client {
    async fn address(&self) -> Result<String> {
        Ok(self.client.printer_ip().await?)
    }

    async fn set_address(&self, address: &str) -> Result<String> {
        Ok(self.client.set_printer_ip(address).await?)
    }
}

impl FileCatalog for Client {
    async fn list(&self) -> Result<Vec<CatalogEntry>> {
        Ok(self.client.files().await?.into_iter().map(CatalogEntry::from).collect())
    }

    async fn upload(&self, file: UploadFile, progress: ProgressSink) -> Result<()> {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let upload = self.client.upload(&file.name, file.contents, tx);
        tokio::pin!(upload);

        let result = loop {
            tokio::select! {
                biased;
                Some(sent) = rx.recv() => {
                    let _ = progress.send(sent.percent());
                }
                result = &mut upload => break result,
            }
        };
        while let Ok(sent) = rx.try_recv() {
            let _ = progress.send(sent.percent());
        }
        Ok(result?)
    }

    async fn delete(&self, name: &str) -> Result<String> {
        Ok(self.client.delete(name).await?)
    }
}

impl PrintControl for Client {
    async fn print(&self, name: &str) -> Result<String> {
        Ok(self.client.print_file(name).await?)
    }

    async fn job_progress(&self, name: &str) -> Result<f64> {
        Ok(self.client.progress(name).await?)
    }
}

impl DeviceStatusSource for Client {
    async fn device_status(&self) -> Result<DeviceStatus> {
        Ok(self.client.print_status().await?.into())
    }
}

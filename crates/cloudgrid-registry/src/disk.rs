//! Data disk resize

use crate::error::{RegistryError, Result};
use crate::model::{DataDisk, Resource, ResourceKind};
use crate::registry::{Registry, normalize_pair};
use cloudgrid_store::resource_key;
use tracing::info;

impl Registry {
    /// Grow a data disk to `new_size_gb`.
    ///
    /// Disks only grow; the stored record is overwritten with the proxy's view
    /// once the resize has been confirmed.
    #[tracing::instrument(skip(self))]
    pub async fn upsize_data_disk(&self, ns: &str, id: &str, new_size_gb: u64) -> Result<DataDisk> {
        let (ns, id) = normalize_pair(ns, id)?;
        let key = resource_key(&ns, ResourceKind::DataDisk.as_str(), &id);
        let _guard = self.locks.lock(&key).await;

        let mut disk: DataDisk = self.load_as(&key, &id).await?;
        if new_size_gb <= disk.disk_size {
            return Err(RegistryError::InvalidArgument(format!(
                "new size {}GB must be larger than the current {}GB",
                new_size_gb, disk.disk_size
            )));
        }

        self.proxy
            .upsize_disk(&disk.connection_name, &disk.csp_resource_name, new_size_gb)
            .await?;
        let info = self
            .proxy
            .get_disk(&disk.connection_name, &disk.csp_resource_name)
            .await?;

        let previous = disk.disk_size;
        disk.apply_provider(info, new_size_gb);
        self.put(&key, &Resource::DataDisk(disk.clone())).await?;

        info!(ns = %ns, id = %id, from = previous, to = disk.disk_size, "Upsized data disk");
        Ok(disk)
    }
}

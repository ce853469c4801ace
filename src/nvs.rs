// StepWatch — NVS-backed persistence
//
// Each persisted field is one i32 entry in the "stepwatch" NVS namespace.

use anyhow::Context;
use esp_idf_svc::nvs::{EspDefaultNvsPartition, EspNvs, NvsDefault};

use stepwatch::config::NVS_NAMESPACE;
use stepwatch::{KeyValueStore, PersistKey};

pub struct NvsStore {
    nvs: EspNvs<NvsDefault>,
}

impl NvsStore {
    pub fn new(partition: EspDefaultNvsPartition) -> anyhow::Result<Self> {
        let nvs = EspNvs::new(partition, NVS_NAMESPACE, true)
            .with_context(|| format!("opening NVS namespace {NVS_NAMESPACE}"))?;
        Ok(Self { nvs })
    }
}

impl KeyValueStore for NvsStore {
    fn read(&mut self, key: PersistKey) -> anyhow::Result<Option<i32>> {
        Ok(self.nvs.get_i32(key.name())?)
    }

    fn write(&mut self, key: PersistKey, value: i32) -> anyhow::Result<()> {
        self.nvs.set_i32(key.name(), value)?;
        Ok(())
    }
}

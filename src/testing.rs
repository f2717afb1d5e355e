//! In-memory stand-ins for the database, object storage and the model.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use bytes::Bytes;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::analysis::prediction::Tip;
use crate::inference::{ImagePayload, InferenceClient, InferenceError};
use crate::nutrition::{Condition, UserProfile};
use crate::profile::repo::ProfileStore;
use crate::scans::repo::ScanStore;
use crate::scans::repo_types::{NewScan, ScanRecord};
use crate::storage::{scan_image_key, ScanImageStore};

#[derive(Default)]
pub struct MemoryStore {
    scans: Mutex<Vec<ScanRecord>>,
    profiles: Mutex<HashMap<Uuid, UserProfile>>,
    tips: Mutex<HashMap<Uuid, Vec<Tip>>>,
}

impl MemoryStore {
    pub fn push_scan(&self, record: ScanRecord) {
        self.scans.lock().unwrap().push(record);
    }

    pub fn put_profile_sync(&self, user_id: Uuid, profile: UserProfile) {
        self.profiles.lock().unwrap().insert(user_id, profile);
    }

    fn newest_first(&self, keep: impl Fn(&ScanRecord) -> bool) -> Vec<ScanRecord> {
        let mut records: Vec<ScanRecord> = self
            .scans
            .lock()
            .unwrap()
            .iter()
            .filter(|r| keep(r))
            .cloned()
            .collect();
        records.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        records
    }
}

#[async_trait]
impl ScanStore for MemoryStore {
    async fn insert_scan(&self, user_id: Uuid, scan: NewScan) -> anyhow::Result<ScanRecord> {
        let record = ScanRecord {
            id: Uuid::new_v4(),
            user_id,
            food_name: scan.food_name,
            nutrition_data: scan.nutrition,
            condition: scan.condition,
            prediction: scan.prediction,
            image_key: None,
            created_at: OffsetDateTime::now_utc(),
        };
        self.push_scan(record.clone());
        Ok(record)
    }

    async fn list_by_user(&self, user_id: Uuid) -> anyhow::Result<Vec<ScanRecord>> {
        Ok(self.newest_first(|r| r.user_id == user_id))
    }

    async fn list_by_condition(
        &self,
        user_id: Uuid,
        condition: Condition,
    ) -> anyhow::Result<Vec<ScanRecord>> {
        Ok(self.newest_first(|r| r.user_id == user_id && r.condition == condition))
    }

    async fn get_scan(&self, user_id: Uuid, scan_id: Uuid) -> anyhow::Result<Option<ScanRecord>> {
        Ok(self
            .newest_first(|r| r.user_id == user_id && r.id == scan_id)
            .into_iter()
            .next())
    }

    async fn delete_scan(&self, user_id: Uuid, scan_id: Uuid) -> anyhow::Result<bool> {
        let mut scans = self.scans.lock().unwrap();
        let before = scans.len();
        scans.retain(|r| !(r.user_id == user_id && r.id == scan_id));
        Ok(scans.len() < before)
    }

    async fn set_image_key(&self, user_id: Uuid, scan_id: Uuid, key: &str) -> anyhow::Result<()> {
        let mut scans = self.scans.lock().unwrap();
        if let Some(r) = scans
            .iter_mut()
            .find(|r| r.user_id == user_id && r.id == scan_id)
        {
            r.image_key = Some(key.to_owned());
        }
        Ok(())
    }
}

#[async_trait]
impl ProfileStore for MemoryStore {
    async fn get_profile(&self, user_id: Uuid) -> anyhow::Result<Option<UserProfile>> {
        Ok(self.profiles.lock().unwrap().get(&user_id).cloned())
    }

    async fn put_profile(&self, user_id: Uuid, profile: &UserProfile) -> anyhow::Result<()> {
        self.put_profile_sync(user_id, profile.clone());
        Ok(())
    }

    async fn get_tips(&self, user_id: Uuid) -> anyhow::Result<Vec<Tip>> {
        Ok(self
            .tips
            .lock()
            .unwrap()
            .get(&user_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn update_tips(&self, user_id: Uuid, tips: &[Tip]) -> anyhow::Result<()> {
        self.tips.lock().unwrap().insert(user_id, tips.to_vec());
        Ok(())
    }
}

#[derive(Default)]
pub struct FakeImages {
    pub objects: Mutex<HashMap<String, Bytes>>,
}

#[async_trait]
impl ScanImageStore for FakeImages {
    async fn put_scan_image(
        &self,
        user_id: Uuid,
        scan_id: Uuid,
        body: Bytes,
        content_type: &str,
    ) -> anyhow::Result<String> {
        let key = scan_image_key(user_id, scan_id, content_type);
        self.objects.lock().unwrap().insert(key.clone(), body);
        Ok(key)
    }

    async fn delete_scan_image(&self, key: &str) -> anyhow::Result<()> {
        self.objects.lock().unwrap().remove(key);
        Ok(())
    }

    async fn presign_scan_image(&self, key: &str, _seconds: u64) -> anyhow::Result<String> {
        Ok(format!("https://fake.local/{key}"))
    }
}

/// Model double with canned replies. A missing reply behaves like an
/// unreachable service.
#[derive(Default)]
pub struct ScriptedInference {
    text: Option<String>,
    image: Option<String>,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedInference {
    pub fn unreachable() -> Self {
        Self::default()
    }

    pub fn replying(text: &str) -> Self {
        Self {
            text: Some(text.to_owned()),
            ..Self::default()
        }
    }

    pub fn with_image_reply(mut self, image: &str) -> Self {
        self.image = Some(image.to_owned());
        self
    }

    /// Text prompts received so far.
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

fn reply(canned: &Option<String>) -> Result<String, InferenceError> {
    canned
        .clone()
        .ok_or_else(|| InferenceError::Transport("connection refused".into()))
}

#[async_trait]
impl InferenceClient for ScriptedInference {
    async fn predict(&self, prompt: &str) -> Result<String, InferenceError> {
        self.prompts.lock().unwrap().push(prompt.to_owned());
        reply(&self.text)
    }

    async fn extract_from_image(
        &self,
        _prompt: &str,
        _image: &ImagePayload,
    ) -> Result<String, InferenceError> {
        reply(&self.image)
    }
}

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Volume attach engine (spec.md §4.5): the three source strategies
//! (`x`/`p`/`c`), dispatched in the order given by `VolumeSpec::source`,
//! falling through to the next strategy whenever a cloud call fails or no
//! candidate is found. Ground: `__main__.py::do_volume` and its
//! `src_vol_x`/`src_vol_p`/`src_vol_c` closures, `aws.py`'s
//! `EC2VolumeCreatePollWaitStep`.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use fleetd_adapters::BlockDeviceFinder;
use fleetd_core::config::VolumeSpec;
use fleetd_core::{AttachOutcome, MacroSet, TagName, TransientResourceManager};
use rand::Rng;
use serde_json::{json, Value};

use crate::hold_impls::AttachedVolumeHold;
use crate::{hold_impls::CreatedVolumeHold, LogSink, SharedLoggingClient};
use crate::error::VolumeError;

/// Backoff schedule for polling a volume out of `creating` state (spec.md
/// §4.5.1, carried forward verbatim from `magic.py::Code`).
const CREATE_POLL_WAIT_STEPS: [f64; 5] = [0.0, 1.0, 5.0, 5.0, 10.0];

/// How long to sleep between checks for the guest device path to appear,
/// once a volume has been attached (spec.md §4.5.1).
const DEVICE_WAIT: Duration = Duration::from_millis(10);

/// A safety bound on pool-collision retries; the original loops forever,
/// but an unbounded loop against a scripted or flaky cloud API is a bug
/// waiting to happen, not a feature.
const POOL_RETRY_LIMIT: u32 = 64;

/// What a single volume attach produced, ready to be folded into the
/// domain's running [`MacroSet`] (spec.md §4.5 step 4).
#[derive(Debug, Clone)]
pub struct VolumeAttachResult {
    pub outcome: AttachOutcome,
    pub volume_id: String,
    pub volume_pool: Option<String>,
    pub attach_source: char,
    pub attached_device: String,
}

struct StrategyResult {
    outcome: AttachOutcome,
    volume_id: String,
}

impl StrategyResult {
    fn unavailable() -> Self {
        Self {
            outcome: AttachOutcome::Unavailable,
            volume_id: String::new(),
        }
    }

    fn already_desired(volume_id: String) -> Self {
        Self {
            outcome: AttachOutcome::AlreadyDesired,
            volume_id,
        }
    }

    fn effected(volume_id: String) -> Self {
        Self {
            outcome: AttachOutcome::Effected,
            volume_id,
        }
    }
}

pub struct VolumeEngine {
    client: SharedLoggingClient,
    block_device_finder: Arc<dyn BlockDeviceFinder>,
    log_sink: LogSink,
}

impl VolumeEngine {
    pub fn new(
        client: SharedLoggingClient,
        block_device_finder: Arc<dyn BlockDeviceFinder>,
        log_sink: LogSink,
    ) -> Self {
        Self {
            client,
            block_device_finder,
            log_sink,
        }
    }

    /// Attempt each strategy in `spec.source` order until one resolves
    /// (spec.md §4.5). A resolved strategy's holds have already been pushed
    /// onto `transc`; this function then waits for the guest device to
    /// appear before returning.
    pub async fn attach(
        &self,
        spec: &VolumeSpec,
        macro_set: &MacroSet,
        transc: &mut TransientResourceManager,
    ) -> Result<VolumeAttachResult, VolumeError> {
        let strategies = fleetd_core::config::SourceStrategy::parse_list(&spec.source)
            .map_err(|_| VolumeError::NoVolumeSource { device: spec.device.clone() })?;

        let mut rng = rand::rng();

        for strategy in &strategies {
            let result = match strategy {
                fleetd_core::config::SourceStrategy::Existing => {
                    self.try_existing(spec, macro_set, transc).await?
                }
                fleetd_core::config::SourceStrategy::Pool => {
                    self.try_pool(spec, macro_set, transc, &mut rng).await?
                }
                fleetd_core::config::SourceStrategy::Create => {
                    self.try_create(spec, macro_set, transc).await?
                }
            };

            if result.outcome.is_resolved() {
                let device = self.wait_for_device(&result.volume_id, &spec.device).await?;
                return Ok(VolumeAttachResult {
                    outcome: result.outcome,
                    volume_id: result.volume_id,
                    volume_pool: spec.pool_name.clone(),
                    attach_source: strategy.as_char(),
                    attached_device: device,
                });
            }
        }

        Err(VolumeError::NoVolumeSource { device: spec.device.clone() })
    }

    /// Strategy "x": reuse a volume-id already given in the spec (spec.md
    /// §4.5, ground: `src_vol_x`).
    async fn try_existing(
        &self,
        spec: &VolumeSpec,
        macro_set: &MacroSet,
        transc: &mut TransientResourceManager,
    ) -> Result<StrategyResult, VolumeError> {
        let vid = match spec.volume_id.as_deref() {
            Some(vid) => vid,
            None => return Ok(StrategyResult::unavailable()),
        };

        let (result, log) = self
            .client
            .call(
                "describe_volumes",
                json!({
                    "Filters": [
                        {"Name": "attachment.instance-id", "Values": [macro_set.instance_id]},
                        {"Name": "attachment.status", "Values": ["attached"]},
                        {"Name": "volume-id", "Values": [vid]},
                    ],
                }),
            )
            .await;
        self.log_sink.lock().push(log);

        let value = match result {
            Ok(v) => v,
            Err(_) => return Ok(StrategyResult::unavailable()),
        };

        if let Some(outcome) = self.check_already_attached(&value, &macro_set.instance_id, &spec.device)? {
            return Ok(outcome);
        }

        match self.do_attach(vid, &spec.device, macro_set, transc).await {
            Ok(()) => Ok(StrategyResult::effected(vid.to_string())),
            Err(_) => Ok(StrategyResult::unavailable()),
        }
    }

    /// Strategy "p": pick a volume out of a tagged pool (spec.md §4.5,
    /// ground: `src_vol_p`).
    async fn try_pool(
        &self,
        spec: &VolumeSpec,
        macro_set: &MacroSet,
        transc: &mut TransientResourceManager,
        rng: &mut impl Rng,
    ) -> Result<StrategyResult, VolumeError> {
        let pool_name = match spec.pool_name.as_deref() {
            Some(p) => p,
            None => return Ok(StrategyResult::unavailable()),
        };

        let (result, log) = self
            .client
            .call(
                "describe_volumes",
                json!({
                    "Filters": [
                        {"Name": format!("tag:{}", TagName::DOMAIN), "Values": [macro_set.domain]},
                        {"Name": format!("tag:{}", TagName::POOL_NAME), "Values": [pool_name]},
                        {"Name": "attachment.instance-id", "Values": [macro_set.instance_id]},
                        {"Name": "attachment.status", "Values": ["attached"]},
                    ],
                }),
            )
            .await;
        self.log_sink.lock().push(log);

        if let Ok(value) = result {
            if let Some(outcome) = self.check_already_attached(&value, &macro_set.instance_id, &spec.device)? {
                return Ok(outcome);
            }
        }

        for run_cnt in 0..POOL_RETRY_LIMIT {
            let (result, log) = self
                .client
                .call(
                    "describe_volumes",
                    json!({
                        "Filters": [
                            {"Name": format!("tag:{}", TagName::DOMAIN), "Values": [macro_set.domain]},
                            {"Name": format!("tag:{}", TagName::POOL_NAME), "Values": [pool_name]},
                            {"Name": "availability-zone", "Values": [macro_set.placement_zone]},
                        ],
                    }),
                )
                .await;
            self.log_sink.lock().push(log);

            let value = match result {
                Ok(v) => v,
                Err(_) => return Ok(StrategyResult::unavailable()),
            };
            let candidates = value["Volumes"].as_array().cloned().unwrap_or_default();
            if candidates.is_empty() {
                return Ok(StrategyResult::unavailable());
            }

            let picked = self.pick_pool_candidate(&candidates, macro_set, run_cnt, rng);
            let vid = match picked {
                Some(vid) => vid,
                None => return Ok(StrategyResult::unavailable()),
            };

            match self.do_attach(&vid, &spec.device, macro_set, transc).await {
                Ok(()) => return Ok(StrategyResult::effected(vid)),
                Err(_) => continue,
            }
        }

        Ok(StrategyResult::unavailable())
    }

    /// The first iteration deterministically tries `candidates[instance_index
    /// % len]` if it's `available`; every later iteration (and the first, if
    /// that pick missed) filters to `available` and untagged candidates and
    /// picks uniformly at random (spec.md §4.5).
    fn pick_pool_candidate(
        &self,
        candidates: &[Value],
        macro_set: &MacroSet,
        run_cnt: u32,
        rng: &mut impl Rng,
    ) -> Option<String> {
        if run_cnt == 0 {
            if let Some(idx) = macro_set.instance_index {
                let cand = &candidates[(idx as usize) % candidates.len()];
                if cand["State"].as_str() == Some("available") {
                    return cand["VolumeId"].as_str().map(str::to_string);
                }
            }
        }

        let available: Vec<&Value> = candidates
            .iter()
            .filter(|c| c["State"].as_str() == Some("available") && !has_tag(c, TagName::TRANSC_ID))
            .collect();
        if available.is_empty() {
            return None;
        }
        let idx = rng.random_range(0..available.len());
        available[idx]["VolumeId"].as_str().map(str::to_string)
    }

    /// Strategy "c": create a fresh volume, poll until available, then
    /// attach (spec.md §4.5, ground: `src_vol_c`). Unlike "x"/"p", a cloud
    /// error here is fatal to the whole attach attempt rather than a signal
    /// to fall through — there is nothing else to retry from.
    async fn try_create(
        &self,
        spec: &VolumeSpec,
        macro_set: &MacroSet,
        transc: &mut TransientResourceManager,
    ) -> Result<StrategyResult, VolumeError> {
        let pool_name = spec.pool_name.clone().unwrap_or_default();
        let create_param = spec.create.clone().unwrap_or_else(|| json!({}));
        let mut obj = create_param.as_object().cloned().unwrap_or_default();

        let existing_tag_specs = obj
            .get("TagSpecifications")
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default();
        let tag_specs = merge_tag_specifications(
            &existing_tag_specs,
            &macro_set.domain,
            &pool_name,
            macro_set.transaction_id.as_str(),
        );
        obj.insert("TagSpecifications".to_string(), tag_specs);
        obj.insert("AvailabilityZone".to_string(), json!(macro_set.placement_zone));
        let create_param = serde_json::Value::Object(obj);

        let (result, log) = self.client.call("create_volume", create_param).await;
        self.log_sink.lock().push(log);
        let value = result.map_err(VolumeError::from)?;

        let volume_id = value["VolumeId"]
            .as_str()
            .unwrap_or_default()
            .to_string();
        let mut state = value["State"].as_str().unwrap_or_default().to_string();

        transc.push(Box::new(CreatedVolumeHold::new(
            self.client.clone(),
            volume_id.clone(),
            self.log_sink.clone(),
        )));

        let mut step = 0usize;
        while state == "creating" {
            let wait = CREATE_POLL_WAIT_STEPS[step.min(CREATE_POLL_WAIT_STEPS.len() - 1)];
            step += 1;
            tokio::time::sleep(Duration::from_secs_f64(wait)).await;

            let (result, log) = self
                .client
                .call("describe_volumes", json!({"VolumeIds": [volume_id]}))
                .await;
            self.log_sink.lock().push(log);
            let value = result.map_err(VolumeError::from)?;
            state = value["Volumes"][0]["State"].as_str().unwrap_or_default().to_string();
        }

        let (result, log) = self
            .client
            .call(
                "attach_volume",
                json!({"Device": spec.device, "InstanceId": macro_set.instance_id, "VolumeId": volume_id}),
            )
            .await;
        self.log_sink.lock().push(log);
        result.map_err(VolumeError::from)?;

        transc.push(Box::new(AttachedVolumeHold::new(
            self.client.clone(),
            volume_id.clone(),
            self.log_sink.clone(),
        )));

        Ok(StrategyResult::effected(volume_id))
    }

    /// Call `attach_volume`, push the hold, then tag the volume with this
    /// run's transaction id (spec.md §4.5 step 3). Any error — attach
    /// itself, or the follow-up tag call — degrades the strategy attempt to
    /// "unavailable"; the caller decides whether to retry or fall through.
    /// If the tag call is what failed, the hold the attach already pushed
    /// stays in place, so an eventual rollback still detaches it.
    async fn do_attach(
        &self,
        volume_id: &str,
        device: &str,
        macro_set: &MacroSet,
        transc: &mut TransientResourceManager,
    ) -> Result<(), ()> {
        let (result, log) = self
            .client
            .call(
                "attach_volume",
                json!({"Device": device, "InstanceId": macro_set.instance_id, "VolumeId": volume_id}),
            )
            .await;
        self.log_sink.lock().push(log);
        result.map_err(|_| ())?;

        transc.push(Box::new(AttachedVolumeHold::new(
            self.client.clone(),
            volume_id.to_string(),
            self.log_sink.clone(),
        )));

        let (result, log) = self
            .client
            .call(
                "create_tags",
                json!({
                    "Resources": [volume_id],
                    "Tags": [{"Key": TagName::TRANSC_ID, "Value": macro_set.transaction_id.as_str()}],
                }),
            )
            .await;
        self.log_sink.lock().push(log);
        result.map_err(|_| ())?;

        Ok(())
    }

    fn check_already_attached(
        &self,
        describe_result: &Value,
        instance_id: &str,
        desired_device: &str,
    ) -> Result<Option<StrategyResult>, VolumeError> {
        for vol in describe_result["Volumes"].as_array().cloned().unwrap_or_default() {
            let volume_id = vol["VolumeId"].as_str().unwrap_or_default().to_string();
            for att in vol["Attachments"].as_array().cloned().unwrap_or_default() {
                if att["InstanceId"].as_str() != Some(instance_id) {
                    continue;
                }
                let attached_device = att["Device"].as_str().unwrap_or_default().to_string();
                if attached_device == desired_device {
                    return Ok(Some(StrategyResult::already_desired(volume_id)));
                }
                return Err(VolumeError::AttachedElsewhere {
                    volume_id,
                    requested: desired_device.to_string(),
                    actual: attached_device,
                });
            }
        }
        Ok(None)
    }

    /// Poll for the guest device path to appear, with no timeout (spec.md
    /// §4.5.1): the block-device finder first, falling back to checking
    /// whether the configured path already exists.
    async fn wait_for_device(&self, volume_id: &str, configured_path: &str) -> Result<String, VolumeError> {
        loop {
            if let Some(dev) = self.block_device_finder.find_by_volume_id(volume_id)? {
                return Ok(dev);
            }
            if Path::new(configured_path).exists() {
                return Ok(configured_path.to_string());
            }
            tokio::time::sleep(DEVICE_WAIT).await;
        }
    }
}

fn has_tag(volume: &Value, key: &str) -> bool {
    volume["Tags"]
        .as_array()
        .map(|tags| tags.iter().any(|t| t["Key"].as_str() == Some(key)))
        .unwrap_or(false)
}

/// Merge the four mandatory tags into `existing`'s `ResourceType=volume`
/// entry, preserving every other entry (and that entry's own tags) as-is;
/// if no volume entry exists yet, append a fresh one (spec.md §4.5 strategy
/// "c": "preserving any existing `ResourceType=volume` entry", ground:
/// `aws.py::add_extra_tags`).
fn merge_tag_specifications(
    existing: &[Value],
    domain: &str,
    pool_name: &str,
    transaction_id: &str,
) -> Value {
    let mandatory = [
        json!({"Key": TagName::DOMAIN, "Value": domain}),
        json!({"Key": TagName::POOL_NAME, "Value": pool_name}),
        json!({"Key": TagName::TRANSC_ID, "Value": transaction_id}),
        json!({"Key": TagName::IN_TRANSIT, "Value": "true"}),
    ];

    let mut specs: Vec<Value> = existing.to_vec();
    match specs.iter_mut().find(|s| s["ResourceType"].as_str() == Some("volume")) {
        Some(vol_spec) => {
            let mut tags = vol_spec["Tags"].as_array().cloned().unwrap_or_default();
            tags.extend(mandatory);
            vol_spec["Tags"] = json!(tags);
        }
        None => specs.push(json!({"ResourceType": "volume", "Tags": mandatory})),
    }

    json!(specs)
}

#[cfg(test)]
#[path = "volume_tests.rs"]
mod tests;

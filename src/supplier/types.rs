use serde::{Deserialize, Serialize};

use crate::scoring::{validate_record, Domains, ScoreError};

/// A supplier as entered by the user or loaded from the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SupplierRecord {
    /// Store-assigned id; None until persisted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    pub name: String,
    pub cost: f64,          // Currency units
    pub co2: f64,           // kg
    pub delivery_time: u32, // Days
    pub ethical_score: f64, // 0-100
}

impl SupplierRecord {
    pub fn new(
        name: impl Into<String>,
        cost: f64,
        co2: f64,
        delivery_time: u32,
        ethical_score: f64,
    ) -> Self {
        Self {
            id: None,
            name: name.into(),
            cost,
            co2,
            delivery_time,
            ethical_score,
        }
    }

    /// "#12 Acme" for stored records, plain name otherwise
    pub fn label(&self) -> String {
        match self.id {
            Some(id) => format!("#{} {}", id, self.name),
            None => self.name.clone(),
        }
    }
}

/// Partial update: only the fields that are Some are changed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SupplierPatch {
    pub name: Option<String>,
    pub cost: Option<f64>,
    pub co2: Option<f64>,
    pub delivery_time: Option<u32>,
    pub ethical_score: Option<f64>,
}

impl SupplierPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.cost.is_none()
            && self.co2.is_none()
            && self.delivery_time.is_none()
            && self.ethical_score.is_none()
    }

    /// Apply to a copy of `record`
    pub fn apply(&self, record: &SupplierRecord) -> SupplierRecord {
        let mut updated = record.clone();
        if let Some(ref name) = self.name {
            updated.name = name.clone();
        }
        if let Some(cost) = self.cost {
            updated.cost = cost;
        }
        if let Some(co2) = self.co2 {
            updated.co2 = co2;
        }
        if let Some(delivery_time) = self.delivery_time {
            updated.delivery_time = delivery_time;
        }
        if let Some(ethical_score) = self.ethical_score {
            updated.ethical_score = ethical_score;
        }
        updated
    }
}

/// Persisted supplier list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SupplierStore {
    pub version: u32,
    #[serde(default = "first_id")]
    pub next_id: u64,
    #[serde(default)]
    pub suppliers: Vec<SupplierRecord>,
}

fn first_id() -> u64 {
    1
}

impl Default for SupplierStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SupplierStore {
    /// Create a new empty store with version 1
    pub fn new() -> Self {
        Self {
            version: 1,
            next_id: first_id(),
            suppliers: Vec::new(),
        }
    }

    /// All records in insertion order
    pub fn records(&self) -> &[SupplierRecord] {
        &self.suppliers
    }

    pub fn len(&self) -> usize {
        self.suppliers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.suppliers.is_empty()
    }

    pub fn get(&self, id: u64) -> Option<&SupplierRecord> {
        self.suppliers.iter().find(|s| s.id == Some(id))
    }

    /// Validate and insert a record, assigning the next id.
    /// Any id already on the record is replaced.
    pub fn add(
        &mut self,
        mut record: SupplierRecord,
        domains: &Domains,
    ) -> Result<u64, ScoreError> {
        validate_record(self.suppliers.len(), &record, domains)?;
        let id = self.next_id;
        record.id = Some(id);
        self.next_id += 1;
        self.suppliers.push(record);
        Ok(id)
    }

    /// Patch a stored record. Returns Ok(None) when the id is unknown.
    /// The patched record is validated before it replaces the original.
    pub fn update(
        &mut self,
        id: u64,
        patch: &SupplierPatch,
        domains: &Domains,
    ) -> Result<Option<&SupplierRecord>, ScoreError> {
        let Some(index) = self.suppliers.iter().position(|s| s.id == Some(id)) else {
            return Ok(None);
        };
        let updated = patch.apply(&self.suppliers[index]);
        validate_record(index, &updated, domains)?;
        self.suppliers[index] = updated;
        Ok(Some(&self.suppliers[index]))
    }

    /// Remove a record.
    /// Returns true if the record existed, false otherwise
    pub fn remove(&mut self, id: u64) -> bool {
        let before = self.suppliers.len();
        self.suppliers.retain(|s| s.id != Some(id));
        self.suppliers.len() != before
    }

    /// Replace every record (used when seeding sample data). Ids keep counting up.
    pub fn replace_all(
        &mut self,
        records: Vec<SupplierRecord>,
        domains: &Domains,
    ) -> Result<usize, ScoreError> {
        for (index, record) in records.iter().enumerate() {
            validate_record(index, record, domains)?;
        }
        self.suppliers.clear();
        for mut record in records {
            record.id = Some(self.next_id);
            self.next_id += 1;
            self.suppliers.push(record);
        }
        Ok(self.suppliers.len())
    }
}

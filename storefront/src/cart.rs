use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Cart {
    #[serde(default)]
    pub items: Vec<CartItem>,
    #[serde(default)]
    pub total_price: i64,
    #[serde(default)]
    pub total_discount: i64,
    #[serde(default)]
    pub item_count: u32,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CartItem {
    #[serde(default)]
    pub variant_id: u64,
    #[serde(default)]
    pub key: Option<String>,
    #[serde(default = "one")]
    pub quantity: u32,
    #[serde(default)]
    pub product_id: u64,
    #[serde(default)]
    pub product_title: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub final_price: i64,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub handle: Option<String>,
    #[serde(default)]
    pub selling_plan_allocation: Option<SellingPlanAllocation>,
}

impl CartItem {
    /// Display title, preferring the product title over the line title.
    pub fn display_title(&self) -> &str {
        if self.product_title.is_empty() {
            &self.title
        } else {
            &self.product_title
        }
    }

    pub fn is_subscription(&self) -> bool {
        self.selling_plan_allocation.is_some()
    }

    /// Identifier for `/cart/change.js`: the line key when present,
    /// otherwise the variant id.
    pub fn change_id(&self) -> String {
        match &self.key {
            Some(key) => key.clone(),
            None => self.variant_id.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SellingPlanAllocation {
    #[serde(default)]
    pub price: i64,
    #[serde(default)]
    pub selling_plan: Option<SellingPlan>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SellingPlan {
    #[serde(default)]
    pub id: u64,
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct AddRequest {
    pub items: Vec<AddItem>,
}

impl AddRequest {
    pub fn single(item: AddItem) -> Self {
        Self { items: vec![item] }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct AddItem {
    pub id: u64,
    pub quantity: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selling_plan: Option<u64>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub properties: BTreeMap<String, String>,
}

impl AddItem {
    pub fn new(id: u64, quantity: u32) -> Self {
        Self {
            id,
            quantity,
            selling_plan: None,
            properties: BTreeMap::new(),
        }
    }

    pub fn with_selling_plan(mut self, selling_plan: Option<u64>) -> Self {
        self.selling_plan = selling_plan;
        self
    }

    pub fn with_property(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties.insert(name.into(), value.into());
        self
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ChangeRequest {
    pub id: String,
    pub quantity: u32,
}

fn one() -> u32 {
    1
}

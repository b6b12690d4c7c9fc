use serde::{Deserialize, Serialize};

//Upstream product record. The catalog owns all of this, we only ever keep
//product ids locally, so every descriptive field is optional on purpose.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductDto {
    pub id: i64,
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub price: Option<f64>,
    pub discount_percentage: Option<f64>,
    pub rating: Option<f64>,
    pub stock: Option<i32>,
    pub tags: Option<Vec<String>>,
    pub brand: Option<String>,
    pub sku: Option<String>,
    pub weight: Option<f64>,
    pub dimensions: Option<DimensionsDto>,
    pub warranty_information: Option<String>,
    pub shipping_information: Option<String>,
    pub availability_status: Option<String>,
    pub reviews: Option<Vec<ReviewDto>>,
    pub return_policy: Option<String>,
    pub minimum_order_quantity: Option<i32>,
    pub meta: Option<MetaDto>,
    pub images: Option<Vec<String>>,
    pub thumbnail: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DimensionsDto {
    pub width: Option<f64>,
    pub height: Option<f64>,
    pub depth: Option<f64>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewDto {
    pub rating: Option<i32>,
    pub comment: Option<String>,
    pub date: Option<String>,
    pub reviewer_name: Option<String>,
    pub reviewer_email: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetaDto {
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
    pub barcode: Option<String>,
    pub qr_code: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ProductPage {
    pub products: Vec<ProductDto>,
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub skip: u64,
    #[serde(default)]
    pub limit: u64,
}

#[derive(Clone, Debug, Deserialize)]
pub struct ProductListQuery {
    pub limit: Option<u32>,
    pub skip: Option<u32>,
    #[serde(rename = "sortBy")]
    pub sort_by: Option<String>,
    pub order: Option<String>,
}

pub type ListingKey = (Option<u32>, Option<u32>, Option<String>, Option<String>);

impl ProductListQuery {
    //The exact parameter tuple, absent params included. A request without a
    //sort must never share an entry with a sorted one.
    pub fn cache_key(&self) -> ListingKey {
        (
            self.limit,
            self.skip,
            self.sort_by.clone(),
            self.order.clone(),
        )
    }
}

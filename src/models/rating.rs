use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{lenient, lenient_timestamp, Record};

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Rating {
    #[serde(skip_deserializing)]
    pub id: String,
    #[serde(deserialize_with = "lenient")]
    pub rating: f64,
    #[serde(deserialize_with = "lenient")]
    pub comment: String,
    #[serde(deserialize_with = "lenient")]
    pub email: String,
    #[serde(deserialize_with = "lenient_timestamp")]
    pub timestamp: Option<DateTime<Utc>>,
}

impl Record for Rating {
    fn set_id(&mut self, id: String) {
        self.id = id;
    }
}

impl Rating {
    pub fn stars(&self) -> Option<u8> {
        let value = self.rating;
        if value.fract() != 0.0 || !(1.0..=5.0).contains(&value) {
            return None;
        }
        Some(value as u8)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StarBucket {
    pub stars: u8,
    pub count: usize,
    pub percentage: f64,
}

/// Ratings that are not whole values 1 to 5 are only counted in `excluded`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RatingDistribution {
    pub total: usize,
    pub excluded: usize,
    pub average: String,
    pub buckets: Vec<StarBucket>,
}

impl Default for RatingDistribution {
    fn default() -> Self {
        Self {
            total: 0,
            excluded: 0,
            average: "0.0".to_string(),
            buckets: (1..=5u8)
                .rev()
                .map(|stars| StarBucket {
                    stars,
                    count: 0,
                    percentage: 0.0,
                })
                .collect(),
        }
    }
}

impl RatingDistribution {
    pub fn bucket(&self, stars: u8) -> Option<&StarBucket> {
        self.buckets.iter().find(|bucket| bucket.stars == stars)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RatingReport {
    pub distribution: RatingDistribution,
    pub recent: Vec<Rating>,
}

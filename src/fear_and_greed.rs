use serde::Deserialize;

const FEAR_AND_GREED_API: &str = "https://api.alternative.me/fng/";

/// One day of the alternative.me crypto fear & greed index. The API returns
/// every field as a string.
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct FearGreedPoint {
    pub value: String,
    pub value_classification: String,
    pub timestamp: String,
}

impl FearGreedPoint {
    pub fn value_i64(&self) -> Option<i64> {
        self.value.parse().ok()
    }
}

#[derive(Debug, Deserialize)]
struct FearGreedResponse {
    data: Vec<FearGreedPoint>,
}

/// The index for the last `limit` days, newest first.
pub async fn get_fear_and_greed_index(limit: u32) -> reqwest::Result<Vec<FearGreedPoint>> {
    reqwest::get(format!("{FEAR_AND_GREED_API}?limit={limit}"))
        .await?
        .error_for_status()?
        .json::<FearGreedResponse>()
        .await
        .map(|body| body.data)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_index_points_test() {
        let json = r#"{
            "name": "Fear and Greed Index",
            "data": [
                {
                    "value": "39",
                    "value_classification": "Fear",
                    "timestamp": "1700179200",
                    "time_until_update": "60681"
                },
                {
                    "value": "62",
                    "value_classification": "Greed",
                    "timestamp": "1700092800"
                }
            ]
        }"#;

        let response = serde_json::from_str::<FearGreedResponse>(json).unwrap();
        assert_eq!(
            response.data,
            vec![
                FearGreedPoint {
                    value: "39".to_string(),
                    value_classification: "Fear".to_string(),
                    timestamp: "1700179200".to_string(),
                },
                FearGreedPoint {
                    value: "62".to_string(),
                    value_classification: "Greed".to_string(),
                    timestamp: "1700092800".to_string(),
                },
            ]
        );
        assert_eq!(response.data[0].value_i64(), Some(39));
    }
}

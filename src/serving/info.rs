//! Descriptive bundle for the info endpoints

use super::evaluation::{EvaluationSnapshot, Reported};
use crate::data::TARGET_COLUMN;
use crate::inference::ModelFamily;
use serde::Serialize;

pub const DATASET_NAME: &str = "員工離職傾向資料 (turnover_data.csv)";

#[derive(Debug, Clone, Serialize)]
pub struct EvaluationInfo {
    pub recall: String,
    pub f1_score: String,
    pub auc: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct DatasetInfo {
    pub name: &'static str,
    pub total_samples: Reported,
    pub train_size: Reported,
    pub test_size: Reported,
    pub target: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChartInfo {
    pub title: &'static str,
    pub description: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct ModelInfoResponse {
    pub evaluation: EvaluationInfo,
    pub dataset: DatasetInfo,
    pub chart_info: ChartInfo,
}

fn chart_info(family: ModelFamily) -> ChartInfo {
    match family {
        ModelFamily::Logistic => ChartInfo {
            title: "邏輯迴歸：工作量壓力 vs 組織風氣壓力",
            description: "隨機抽樣 200 筆員工資料，依離職傾向著色；邏輯迴歸以標準化後的兩項壓力分數畫出線性決策邊界。",
        },
        ModelFamily::Rf => ChartInfo {
            title: "隨機森林：工作量壓力 vs 組織風氣壓力",
            description: "隨機抽樣 200 筆員工資料，依離職傾向著色；隨機森林以原始壓力分數投票，決策邊界可為非線性。",
        },
    }
}

pub fn model_info(family: ModelFamily, snapshot: &EvaluationSnapshot) -> ModelInfoResponse {
    ModelInfoResponse {
        evaluation: EvaluationInfo {
            recall: snapshot.recall.clone(),
            f1_score: snapshot.f1_score.clone(),
            auc: snapshot.auc.clone(),
        },
        dataset: DatasetInfo {
            name: DATASET_NAME,
            total_samples: snapshot.total_samples.clone(),
            train_size: snapshot.train_size.clone(),
            test_size: snapshot.test_size.clone(),
            target: TARGET_COLUMN,
        },
        chart_info: chart_info(family),
    }
}

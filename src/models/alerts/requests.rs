use serde::Deserialize;
use ts_rs::TS;

use super::entities::AlertType;

/// 家长对提醒的操作
#[derive(Debug, Clone, PartialEq, Deserialize, TS)]
#[serde(tag = "action", rename_all = "kebab-case")]
#[ts(export, export_to = "../frontend/src/types/generated/alert.ts")]
pub enum AlertAction {
    MarkViewed { alert_id: i64 },
    MarkAllViewed,
}

#[derive(Debug, Clone)]
pub struct NewAlert {
    pub parent_id: i64,
    pub student_id: i64,
    pub assignment_id: Option<i64>,
    pub alert_type: AlertType,
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_parses_kebab_case_tags() {
        let action: AlertAction =
            serde_json::from_str(r#"{"action":"mark-viewed","alert_id":9}"#).unwrap();
        assert_eq!(action, AlertAction::MarkViewed { alert_id: 9 });

        let action: AlertAction = serde_json::from_str(r#"{"action":"mark-all-viewed"}"#).unwrap();
        assert_eq!(action, AlertAction::MarkAllViewed);

        assert!(serde_json::from_str::<AlertAction>(r#"{"action":"delete"}"#).is_err());
    }
}

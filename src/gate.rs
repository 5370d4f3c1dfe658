use serde::{Deserialize, Serialize};

use crate::utils::ModerationError;

/// 需要拦截的 API 上传模块名
pub const UPLOAD_MODULE: &str = "upload";

/// 发起请求的用户
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct User {
    pub name: String,
    #[serde(default)]
    pub groups: Vec<String>,
}

impl User {
    pub fn new(name: impl Into<String>, groups: &[&str]) -> Self {
        Self {
            name: name.into(),
            groups: groups.iter().map(|g| g.to_string()).collect(),
        }
    }

    pub fn in_group(&self, group: &str) -> bool {
        self.groups.iter().any(|g| g == group)
    }
}

/// 跳过审核的规则
///
/// 用户名在 `skip_users` 中，或属于 `skip_groups` 中任一用户组时，
/// 用户的编辑直接生效而不进入审核队列。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BypassPolicy {
    pub skip_groups: Vec<String>,
    pub skip_users: Vec<String>,
}

impl Default for BypassPolicy {
    fn default() -> Self {
        Self {
            skip_groups: vec!["sysop".into(), "bot".into(), "automoderated".into()],
            skip_users: Vec::new(),
        }
    }
}

impl BypassPolicy {
    /// 用户是否可以跳过审核
    pub fn can_skip(&self, user: &User) -> bool {
        self.skip_users.iter().any(|u| *u == user.name)
            || self.skip_groups.iter().any(|g| user.in_group(g))
    }

    /// 用户的编辑是否需要进入审核队列
    pub fn should_queue(&self, user: &User) -> bool {
        !self.can_skip(user)
    }

    /// 检查用户能否执行某个 API 模块
    ///
    /// 上传的描述页无法经过审核，因此需要审核的用户不能通过 API 上传文件。
    pub fn check_can_execute(&self, module: &str, user: &User) -> Result<(), ModerationError> {
        if module == UPLOAD_MODULE && !self.can_skip(user) {
            tracing::debug!(user = %user.name, module, "API upload refused for moderated user");
            return Err(ModerationError::NoUploadModule);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_groups_skip() {
        let policy = BypassPolicy::default();
        assert!(policy.can_skip(&User::new("Admin", &["user", "sysop"])));
        assert!(policy.can_skip(&User::new("Robot", &["bot"])));
        assert!(policy.should_queue(&User::new("Newbie", &["user"])));
    }

    #[test]
    fn test_skip_users() {
        let policy = BypassPolicy {
            skip_groups: Vec::new(),
            skip_users: vec!["Trusted".to_string()],
        };
        assert!(policy.can_skip(&User::new("Trusted", &[])));
        assert!(!policy.can_skip(&User::new("Admin", &["sysop"])));
    }

    #[test]
    fn test_upload_gate() {
        let policy = BypassPolicy::default();
        let moderated = User::new("Newbie", &["user"]);
        let trusted = User::new("Mod", &["automoderated"]);

        let result = policy.check_can_execute("upload", &moderated);
        assert!(matches!(result, Err(ModerationError::NoUploadModule)));

        assert!(policy.check_can_execute("upload", &trusted).is_ok());
        assert!(policy.check_can_execute("edit", &moderated).is_ok());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let policy: BypassPolicy = serde_json::from_str(r#"{"skip_users": ["X"]}"#).unwrap();
        assert_eq!(policy.skip_users, vec!["X".to_string()]);
        assert!(policy.skip_groups.contains(&"sysop".to_string()));
    }
}

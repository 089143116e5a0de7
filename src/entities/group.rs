// 👥 Group - people pooling shared expenses
//
// Exactly one member is the owner, and it is the user who created the group.

use crate::error::{LedgerError, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Owner,
    Member,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupMember {
    pub user_id: String,
    pub role: Role,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    pub id: String,

    pub name: String,

    #[serde(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    pub owner_id: String,

    #[serde(default)]
    pub members: Vec<GroupMember>,
}

impl Group {
    /// New group whose only member is its owner
    pub fn new(id: impl Into<String>, name: impl Into<String>, owner_id: impl Into<String>) -> Self {
        let owner_id = owner_id.into();
        Group {
            id: id.into(),
            name: name.into(),
            description: None,
            members: vec![GroupMember {
                user_id: owner_id.clone(),
                role: Role::Owner,
            }],
            owner_id,
        }
    }

    /// New group with a generated id
    pub fn create(name: impl Into<String>, owner_id: impl Into<String>) -> Self {
        Group::new(uuid::Uuid::new_v4().to_string(), name, owner_id)
    }

    pub fn with_description(self, description: impl Into<String>) -> Self {
        Group {
            description: Some(description.into()),
            ..self
        }
    }

    /// Copy of the group with `user_id` added as a regular member
    pub fn with_member(self, user_id: impl Into<String>) -> Result<Self> {
        let user_id = user_id.into();
        if self.is_member(&user_id) {
            return Err(LedgerError::invalid_record(
                &self.id,
                format!("{} is already a member", user_id),
            ));
        }

        let mut members = self.members;
        members.push(GroupMember {
            user_id,
            role: Role::Member,
        });
        Ok(Group { members, ..self })
    }

    pub fn is_member(&self, user_id: &str) -> bool {
        self.members.iter().any(|m| m.user_id == user_id)
    }

    pub fn member_ids(&self) -> impl Iterator<Item = &str> {
        self.members.iter().map(|m| m.user_id.as_str())
    }

    pub fn member_count(&self) -> usize {
        self.members.len()
    }

    /// One owner, matching `owner_id`, and no duplicate members
    pub fn validate(&self) -> Result<()> {
        let owners: Vec<&GroupMember> = self
            .members
            .iter()
            .filter(|m| m.role == Role::Owner)
            .collect();

        match owners.as_slice() {
            [owner] if owner.user_id == self.owner_id => {}
            [owner] => {
                return Err(LedgerError::invalid_record(
                    &self.id,
                    format!(
                        "owner member {} does not match owner_id {}",
                        owner.user_id, self.owner_id
                    ),
                ))
            }
            _ => {
                return Err(LedgerError::invalid_record(
                    &self.id,
                    format!("expected exactly one owner, found {}", owners.len()),
                ))
            }
        }

        let mut ids: Vec<&str> = self.member_ids().collect();
        ids.sort_unstable();
        if ids.windows(2).any(|pair| pair[0] == pair[1]) {
            return Err(LedgerError::invalid_record(&self.id, "duplicate member"));
        }

        Ok(())
    }
}

// ============================================================================
// TESTS
// ============================================================================

use crate::value::{List, Value};

use super::accumulate::{MemberAddressing, array_at, read_at, resolve_path};
use super::controller::{FormEngine, FormError, FormResult};
use super::path::FieldPath;

impl FormEngine {
    /// Appends a member to the list at `path`.
    pub fn push_member(
        &mut self,
        path: impl Into<FieldPath>,
        member: impl Into<Value>,
    ) -> FormResult<()> {
        let path = path.into();
        let mut members = self.members_at(&path)?;
        members.push_back(member.into());
        self.set_field(path, Value::List(members))
    }

    /// Removes the member whose key is `key` from the list at `path`, together
    /// with its errors.
    pub fn remove_member(&mut self, path: impl Into<FieldPath>, key: &str) -> FormResult<()> {
        let path = path.into();
        let resolved = resolve_path(&self.value, &self.schema, &path, MemberAddressing::ByIndex)?;
        let array = array_at(&self.schema, resolved.segments(), &path)?;
        let mut members = self.members_at(&path)?;
        let index = members
            .iter()
            .position(|member| array.key_of(member) == key)
            .ok_or_else(|| FormError::MissingMember {
                path: path.clone(),
                key: key.to_owned(),
            })?;
        members.remove(index);
        self.set_field(path, Value::List(members))
    }

    fn members_at(&self, path: &FieldPath) -> FormResult<List> {
        let resolved = resolve_path(&self.value, &self.schema, path, MemberAddressing::ByIndex)?;
        array_at(&self.schema, resolved.segments(), path)?;
        match read_at(&self.value, resolved.segments(), path)? {
            Value::List(members) => Ok(members.clone()),
            Value::Null => Ok(List::new()),
            _ => Err(FormError::PathMismatch {
                path: path.clone(),
                expected: "list",
            }),
        }
    }
}

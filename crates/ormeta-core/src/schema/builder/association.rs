use super::{AssociationDef, BuildCatalog};
use crate::schema::{Association, MemberId, TypeId};
use crate::{stmt, Error, Result};

use tracing::trace;

impl BuildCatalog<'_> {
    /// Resolve every association definition into key member ids.
    pub(super) fn resolve_associations(&mut self) -> Result<()> {
        // Associations reference members of arbitrary types, so resolve them
        // all against the immutable state first and assign afterwards.
        let mut resolved = vec![];

        for index in 0..self.defs.len() {
            let ty = TypeId(index);
            let offset = self.offset(ty);

            for (i, def) in self.defs[index].members.iter().enumerate() {
                let Some(association) = &def.association else {
                    continue;
                };

                let id = ty.member(offset + i);
                resolved.push(self.resolve_association(id, association)?);
            }
        }

        for association in resolved {
            let explicit_null = self.member_def(association.this_member).can_be_null;
            let member = self.member_mut(association.this_member);

            member.ty = if association.is_many {
                stmt::Type::list(stmt::Type::Model(association.other_type))
            } else {
                stmt::Type::Model(association.other_type)
            };

            // A foreign key association is null exactly when its key can be.
            if association.is_foreign_key && explicit_null.is_none() {
                member.can_be_null = association.is_nullable;
            }

            member.association = Some(association);
        }

        Ok(())
    }

    fn resolve_association(&self, id: MemberId, def: &AssociationDef) -> Result<Association> {
        let full_name = self.full_name(id);

        let Some(&other_type) = self.lookup.get(&def.other_type) else {
            return Err(Error::invalid_mapping(format!(
                "association `{full_name}` references `{}`, which is not mapped",
                def.other_type
            )));
        };

        if def.is_foreign_key && def.is_many {
            return Err(Error::invalid_mapping(format!(
                "foreign key association `{full_name}` cannot yield many instances"
            )));
        }

        if def.is_foreign_key && def.this_key.is_empty() {
            return Err(Error::invalid_mapping(format!(
                "foreign key association `{full_name}` does not name its key members"
            )));
        }

        let this_key = match &def.this_key[..] {
            [] => self.identity(id.ty),
            names => self.resolve_key(id.ty, names, &full_name)?,
        };

        let other_key = match &def.other_key[..] {
            [] => self.identity(other_type),
            names => self.resolve_key(other_type, names, &full_name)?,
        };

        if this_key.is_empty() || other_key.is_empty() {
            return Err(Error::invalid_mapping(format!(
                "association `{full_name}` has no key; map a primary key or name the key members"
            )));
        }

        if this_key.len() != other_key.len() {
            return Err(Error::invalid_mapping(format!(
                "association `{full_name}` has {} key members on this side but {} on the other",
                this_key.len(),
                other_key.len()
            )));
        }

        for (this, other) in this_key.iter().zip(&other_key) {
            let (this, other) = (self.member(*this), self.member(*other));

            if this.ty != other.ty {
                return Err(Error::invalid_mapping(format!(
                    "association `{full_name}` pairs `{}` ({}) with `{}` ({})",
                    this.name,
                    this.ty.name(),
                    other.name,
                    other.ty.name()
                )));
            }
        }

        let is_nullable = this_key.iter().any(|key| self.member(*key).can_be_null);

        trace!(
            association = %full_name,
            other_type = %def.other_type,
            is_foreign_key = def.is_foreign_key,
            is_many = def.is_many,
            "resolved association"
        );

        Ok(Association {
            this_member: id,
            this_type: id.ty,
            other_type,
            this_key,
            other_key,
            other_member: None,
            is_foreign_key: def.is_foreign_key,
            is_many: def.is_many,
            is_nullable,
            is_unique: def.is_unique,
            delete_rule: def.delete_rule.clone(),
            delete_on_null: def.delete_on_null,
        })
    }

    fn resolve_key(&self, ty: TypeId, names: &[String], full_name: &str) -> Result<Vec<MemberId>> {
        names
            .iter()
            .map(|name| {
                let Some(id) = self.member_id_by_name(ty, name) else {
                    return Err(Error::invalid_mapping(format!(
                        "association `{full_name}` names key member `{name}`, which `{}` does not map",
                        self.defs[ty.0].name
                    )));
                };

                if self.member_def(id).association.is_some() {
                    return Err(Error::invalid_mapping(format!(
                        "association `{full_name}` uses association `{name}` as a key member"
                    )));
                }

                Ok(id)
            })
            .collect()
    }

    /// Link every association with the association on the other type that
    /// mirrors its keys.
    pub(super) fn pair_associations(&mut self) -> Result<()> {
        let mut pairs = vec![];

        for members in &self.declared {
            for member in members {
                let Some(association) = &member.association else {
                    continue;
                };

                let candidates: Vec<_> = self.layouts[association.other_type.0]
                    .iter()
                    .copied()
                    .filter(|other| *other != member.id)
                    .filter(|other| match &self.member(*other).association {
                        Some(other) => {
                            other.this_key == association.other_key
                                && other.other_key == association.this_key
                        }
                        None => false,
                    })
                    .collect();

                match &candidates[..] {
                    [] => {}
                    [pair] => pairs.push((member.id, *pair)),
                    _ => {
                        return Err(Error::invalid_mapping(format!(
                            "association `{}` matches more than one association on `{}`",
                            self.full_name(member.id),
                            self.defs[association.other_type.0].name
                        )));
                    }
                }
            }
        }

        for (id, pair) in pairs {
            if let Some(association) = self.member_mut(id).association.as_mut() {
                association.other_member = Some(pair);
            }
        }

        Ok(())
    }

    fn full_name(&self, id: MemberId) -> String {
        format!("{}::{}", self.defs[id.ty.0].name, self.member(id).name)
    }
}

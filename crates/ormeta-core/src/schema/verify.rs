use super::{Catalog, Member, MetaType};
use crate::{stmt::Value, Error, Result};

use std::collections::HashMap;

struct Verify<'a> {
    catalog: &'a Catalog,
}

impl Catalog {
    pub(super) fn verify(&self) -> Result<()> {
        Verify { catalog: self }.verify()
    }
}

impl Verify<'_> {
    fn verify(&self) -> Result<()> {
        for ty in self.catalog.types() {
            self.verify_ordinals_are_contiguous(ty)?;

            for member in ty.declared_members() {
                self.verify_member(member)?;
            }

            self.verify_single_version_and_discriminator(ty)?;
            self.verify_columns_are_unique(ty)?;
        }

        for root in self.catalog.types().filter(|ty| ty.is_root()) {
            if !root.derived().is_empty() {
                self.verify_hierarchy(root)?;
            }
        }

        Ok(())
    }

    fn verify_ordinals_are_contiguous(&self, ty: &MetaType) -> Result<()> {
        for (ordinal, member) in ty.members().enumerate() {
            if member.ordinal() != ordinal {
                return Err(Error::invalid_mapping(format!(
                    "member `{}` has ordinal {} but is laid out at {}",
                    member.full_name(self.catalog),
                    member.ordinal(),
                    ordinal
                )));
            }
        }

        Ok(())
    }

    fn verify_member(&self, member: &Member) -> Result<()> {
        let full_name = || member.full_name(self.catalog);

        if member.is_primary_key() && member.can_be_null() {
            return Err(Error::invalid_mapping(format!(
                "primary key `{}` cannot be null",
                full_name()
            )));
        }

        if member.is_column()
            && (member.member_accessor().is_none() || member.storage_accessor().is_none())
        {
            return Err(Error::invalid_mapping(format!(
                "persistent member `{}` has no accessor",
                full_name()
            )));
        }

        if member.is_deferred()
            && (member.deferred_source_accessor().is_none()
                || member.deferred_value_accessor().is_none()
                || member.load_method().is_none())
        {
            return Err(Error::invalid_mapping(format!(
                "deferred member `{}` needs source and value accessors and a load method",
                full_name()
            )));
        }

        if let Some(association) = member.association() {
            if association.this_member != member.id()
                || association.this_type != member.declaring_type()
            {
                return Err(Error::invalid_mapping(format!(
                    "association `{}` is attached to the wrong member",
                    full_name()
                )));
            }
        }

        Ok(())
    }

    fn verify_single_version_and_discriminator(&self, ty: &MetaType) -> Result<()> {
        let roles: [(&str, fn(&Member) -> bool); 2] = [
            ("version", Member::is_version),
            ("discriminator", Member::is_discriminator),
        ];

        for (role, has_role) in roles {
            let members: Vec<_> = ty.members().filter(|member| has_role(member)).collect();

            if let [first, second, ..] = &members[..] {
                return Err(Error::invalid_mapping(format!(
                    "type `{}` has more than one {role} member: `{}` and `{}`",
                    ty.name(),
                    first.name(),
                    second.name()
                )));
            }
        }

        Ok(())
    }

    fn verify_columns_are_unique(&self, ty: &MetaType) -> Result<()> {
        let mut columns = HashMap::new();

        for member in ty.column_members() {
            if let Some(previous) = columns.insert(member.mapped_name(), member.name()) {
                return Err(Error::invalid_mapping(format!(
                    "column `{}` of `{}` is mapped by both `{}` and `{}`",
                    member.mapped_name(),
                    ty.name(),
                    previous,
                    member.name()
                )));
            }
        }

        Ok(())
    }

    fn verify_hierarchy(&self, root: &MetaType) -> Result<()> {
        let root_name = root.name();

        if root.discriminator_member().is_none() {
            return Err(Error::invalid_mapping(format!(
                "inheritance root `{root_name}` has no discriminator member"
            )));
        }

        let hierarchy = self.catalog.hierarchy(root);
        let mut codes: Vec<(&Value, &MetaType)> = vec![];

        for ty in &hierarchy {
            let Some(code) = ty.inheritance_code() else {
                continue;
            };

            if let Some((_, other)) = codes.iter().find(|(other, _)| *other == code) {
                return Err(Error::invalid_mapping(format!(
                    "types `{}` and `{}` share inheritance code {code:?}",
                    other.name(),
                    ty.name()
                )));
            }

            codes.push((code, *ty));
        }

        let defaults: Vec<_> = hierarchy
            .iter()
            .filter(|ty| ty.is_inheritance_default())
            .collect();

        if defaults.len() > 1 {
            return Err(Error::invalid_mapping(format!(
                "hierarchy `{root_name}` has more than one inheritance default"
            )));
        }

        Ok(())
    }
}

mod association;

mod def;
pub use def::{AssociationDef, MemberDef, MemberHandles, TypeDef};

use super::{
    Catalog, MappingSource, MappingSourceKind, Member, MemberId, MemberKind, MemberRef, MetaType,
    Name, TypeId, UpdateCheck,
};
use crate::{stmt, Error, Result};

use indexmap::IndexMap;
use std::sync::Arc;
use tracing::{debug, trace};

const DEFAULT_STRING_DB_TYPE: &str = "NVarChar(4000)";

#[derive(Debug)]
pub struct Builder {
    /// If set, prefix all table names with this string
    table_name_prefix: Option<String>,

    /// Column type for string members that do not specify one
    default_string_db_type: String,
}

/// Used to track state during the build process
struct BuildCatalog<'a> {
    /// Build options
    builder: &'a Builder,

    source: MappingSourceKind,

    /// Type definitions, indexed by `TypeId`
    defs: Vec<TypeDef>,

    /// Maps type names to identifiers
    lookup: IndexMap<String, TypeId>,

    /// Base types of each type, nearest first
    ancestors: Vec<Vec<TypeId>>,

    /// Types ordered so that every base precedes the types deriving from it
    order: Vec<TypeId>,

    /// Full member layout of each type, in ordinal order
    layouts: Vec<Vec<MemberId>>,

    /// Members declared by each type, as they are built
    declared: Vec<Vec<Member>>,

    /// Inheritance codes, cast to the hierarchy's discriminator type
    codes: Vec<Option<stmt::Value>>,
}

impl Builder {
    pub fn new() -> Self {
        Self {
            table_name_prefix: None,
            default_string_db_type: DEFAULT_STRING_DB_TYPE.to_string(),
        }
    }

    pub fn table_name_prefix(&mut self, prefix: &str) -> &mut Self {
        self.table_name_prefix = Some(prefix.to_string());
        self
    }

    pub fn default_string_db_type(&mut self, db_type: &str) -> &mut Self {
        self.default_string_db_type = db_type.to_string();
        self
    }

    pub fn build(&self, source: impl Into<MappingSource>) -> Result<Catalog> {
        let source = source.into();
        let kind = source.kind();
        let defs = source.into_type_defs()?;

        debug!(source = ?kind, types = defs.len(), "building mapping catalog");

        let mut builder = BuildCatalog::new(self, kind, defs)?;
        builder.link_inheritance()?;
        builder.build_members()?;
        builder.link_discriminators()?;
        builder.resolve_associations()?;
        builder.pair_associations()?;

        let catalog = builder.into_catalog();

        // Verify the catalog structure
        catalog.verify()?;

        Ok(catalog)
    }
}

impl Default for Builder {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> BuildCatalog<'a> {
    fn new(builder: &'a Builder, source: MappingSourceKind, defs: Vec<TypeDef>) -> Result<Self> {
        let mut lookup = IndexMap::new();

        for (index, def) in defs.iter().enumerate() {
            if lookup.insert(def.name.clone(), TypeId(index)).is_some() {
                return Err(Error::invalid_mapping(format!(
                    "type `{}` is mapped more than once",
                    def.name
                )));
            }
        }

        let len = defs.len();

        Ok(Self {
            builder,
            source,
            defs,
            lookup,
            ancestors: vec![vec![]; len],
            order: vec![],
            layouts: vec![vec![]; len],
            declared: vec![vec![]; len],
            codes: vec![None; len],
        })
    }

    fn link_inheritance(&mut self) -> Result<()> {
        for index in 0..self.defs.len() {
            let id = TypeId(index);
            let ancestors = self.ancestors_of(id)?;

            if !ancestors.is_empty() && self.defs[index].table.is_some() {
                return Err(Error::invalid_mapping(format!(
                    "type `{}` derives from `{}` and cannot declare its own table",
                    self.defs[index].name,
                    self.defs[ancestors[0].0].name,
                )));
            }

            self.ancestors[index] = ancestors;
        }

        // Build bases before the types deriving from them. The sort is stable,
        // so types at the same depth keep their declaration order.
        self.order = (0..self.defs.len()).map(TypeId).collect();
        self.order.sort_by_key(|id| self.ancestors[id.0].len());

        Ok(())
    }

    fn ancestors_of(&self, id: TypeId) -> Result<Vec<TypeId>> {
        let mut ancestors = vec![];
        let mut curr = id;

        while let Some(base) = &self.defs[curr.0].base {
            let Some(&base_id) = self.lookup.get(base) else {
                return Err(Error::invalid_mapping(format!(
                    "type `{}` derives from `{}`, which is not mapped",
                    self.defs[curr.0].name, base
                )));
            };

            if base_id == id || ancestors.contains(&base_id) {
                return Err(Error::invalid_mapping(format!(
                    "type `{}` is part of an inheritance cycle",
                    self.defs[id.0].name
                )));
            }

            ancestors.push(base_id);
            curr = base_id;
        }

        Ok(ancestors)
    }

    fn build_members(&mut self) -> Result<()> {
        for position in 0..self.order.len() {
            let id = self.order[position];

            let mut layout = match self.ancestors[id.0].first() {
                Some(base) => self.layouts[base.0].clone(),
                None => vec![],
            };

            let inherited = layout.len();
            let mut declared = Vec::with_capacity(self.defs[id.0].members.len());

            for def in &self.defs[id.0].members {
                // Members declared so far are not reachable through `member`
                // until the layout is stored.
                let taken = layout[..inherited]
                    .iter()
                    .map(|member_id| self.member(*member_id).name())
                    .chain(declared.iter().map(Member::name))
                    .any(|name| name == def.name);

                if taken {
                    return Err(Error::invalid_mapping(format!(
                        "member `{}::{}` is mapped more than once",
                        self.defs[id.0].name, def.name
                    )));
                }

                let member = self.build_member(id, layout.len(), def)?;
                layout.push(member.id);
                declared.push(member);
            }

            debug!(
                ty = %self.defs[id.0].name,
                declared = declared.len(),
                members = layout.len(),
                "laid out members"
            );

            self.layouts[id.0] = layout;
            self.declared[id.0] = declared;
        }

        Ok(())
    }

    fn build_member(&self, ty: TypeId, ordinal: usize, def: &MemberDef) -> Result<Member> {
        let ty_def = &self.defs[ty.0];
        let full_name = format!("{}::{}", ty_def.name, def.name);
        let association = def.association.is_some();
        let column = def.persistent && !association;

        if association && !def.persistent {
            return Err(Error::invalid_mapping(format!(
                "association `{full_name}` is mapped to a constraint and cannot be unmapped"
            )));
        }

        if !column {
            let kind = if association { "association" } else { "unmapped member" };
            let roles = [
                (def.primary_key, "part of the primary key"),
                (def.version, "a version"),
                (def.discriminator, "a discriminator"),
                (def.db_generated, "database generated"),
                (def.expression.is_some(), "a computed column"),
                (def.deferred && !association, "deferred"),
            ];

            if let Some((_, role)) = roles.iter().find(|(flag, _)| *flag) {
                return Err(Error::invalid_mapping(format!(
                    "{kind} `{full_name}` cannot be {role}"
                )));
            }
        }

        let can_be_null = match def.can_be_null {
            Some(true) if def.primary_key => {
                return Err(Error::invalid_mapping(format!(
                    "primary key `{full_name}` cannot be null"
                )));
            }
            Some(can_be_null) => can_be_null,
            None if association => def.association.as_ref().is_some_and(|a| !a.is_many),
            None => {
                !def.primary_key
                    && !def.version
                    && matches!(def.ty, stmt::Type::String | stmt::Type::Bytes)
            }
        };

        if def.version && !(def.ty.is_numeric() || def.ty.is_bytes()) {
            return Err(Error::invalid_mapping(format!(
                "version member `{full_name}` must be an integer or bytes, not {}",
                def.ty.name()
            )));
        }

        if def.discriminator && ty_def.base.is_some() {
            return Err(Error::invalid_mapping(format!(
                "discriminator `{full_name}` must be declared by the inheritance root"
            )));
        }

        if def.deferred && def.primary_key {
            return Err(Error::invalid_mapping(format!(
                "primary key `{full_name}` cannot be deferred"
            )));
        }

        let db_type = if column {
            let default_db_type = || {
                def.ty
                    .default_db_type(&self.builder.default_string_db_type)
            };

            match def.db_type.clone().or_else(default_db_type) {
                Some(db_type) => Some(db_type),
                None => {
                    return Err(Error::invalid_mapping(format!(
                        "member `{full_name}` of type {} needs an explicit db type",
                        def.ty.name()
                    )));
                }
            }
        } else {
            None
        };

        let handles = &def.handles;

        if column && handles.accessor.is_none() {
            return Err(Error::invalid_mapping(format!(
                "persistent member `{full_name}` has no accessor"
            )));
        }

        let has_deferred_handles = handles.deferred_source.is_some()
            && handles.deferred_value.is_some()
            && handles.load.is_some();

        if def.deferred && !has_deferred_handles {
            return Err(Error::invalid_mapping(format!(
                "deferred member `{full_name}` needs source and value accessors and a load method"
            )));
        }

        if !def.deferred && (handles.deferred_source.is_some() || handles.deferred_value.is_some())
        {
            return Err(Error::invalid_mapping(format!(
                "member `{full_name}` has deferred accessors but is not deferred"
            )));
        }

        let db_generated = def.db_generated || def.expression.is_some() || def.version;
        let auto_sync = def.auto_sync.resolve(def.primary_key, db_generated, def.version);
        let update_check = if !column || def.version {
            UpdateCheck::Never
        } else {
            def.update_check
        };

        let member_ref = MemberRef::new(&ty_def.name, &def.name, def.kind);
        let storage_member = match &def.storage {
            Some(storage) => MemberRef::new(&ty_def.name, storage, MemberKind::Field),
            None => member_ref.clone(),
        };

        trace!(member = %full_name, ordinal, ?auto_sync, ?update_check, "built member");

        Ok(Member {
            id: ty.member(ordinal),
            name: def.name.clone(),
            member: member_ref,
            storage_member,
            mapped_name: def.column.clone().unwrap_or_else(|| def.name.clone()),
            db_type,
            expression: def.expression.clone(),
            ty: def.ty.clone(),
            primary_key: def.primary_key,
            version: def.version,
            discriminator: def.discriminator,
            db_generated,
            persistent: def.persistent,
            deferred: def.deferred,
            can_be_null,
            auto_sync,
            update_check,
            member_accessor: handles.accessor.clone(),
            storage_accessor: handles
                .storage_accessor
                .clone()
                .or_else(|| handles.accessor.clone()),
            deferred_source_accessor: handles.deferred_source.clone(),
            deferred_value_accessor: handles.deferred_value.clone(),
            association: None,
            load_method: handles.load.clone(),
            source: self.source,
        })
    }

    /// Casts each type's inheritance code to the type of its hierarchy's
    /// discriminator.
    fn link_discriminators(&mut self) -> Result<()> {
        for index in 0..self.defs.len() {
            let Some(code) = self.defs[index].inheritance_code.clone() else {
                continue;
            };

            let root = self.ancestors[index].last().copied().unwrap_or(TypeId(index));
            let discriminator = self.layouts[root.0]
                .iter()
                .map(|id| self.member(*id))
                .find(|member| member.discriminator);

            let Some(discriminator) = discriminator else {
                return Err(Error::invalid_mapping(format!(
                    "type `{}` has an inheritance code but `{}` has no discriminator",
                    self.defs[index].name, self.defs[root.0].name
                )));
            };

            let code = discriminator.ty.cast(code).map_err(|err| {
                err.context(Error::invalid_mapping(format!(
                    "inheritance code of `{}` does not match discriminator `{}`",
                    self.defs[index].name, discriminator.name
                )))
            })?;

            self.codes[index] = Some(code);
        }

        Ok(())
    }

    /// Offset of the first member declared by `ty` in its layout.
    fn offset(&self, ty: TypeId) -> usize {
        self.layouts[ty.0].len() - self.defs[ty.0].members.len()
    }

    fn member(&self, id: MemberId) -> &Member {
        &self.declared[id.ty.0][id.ordinal - self.offset(id.ty)]
    }

    fn member_mut(&mut self, id: MemberId) -> &mut Member {
        let offset = self.offset(id.ty);
        &mut self.declared[id.ty.0][id.ordinal - offset]
    }

    fn member_def(&self, id: MemberId) -> &MemberDef {
        &self.defs[id.ty.0].members[id.ordinal - self.offset(id.ty)]
    }

    fn member_id_by_name(&self, ty: TypeId, name: &str) -> Option<MemberId> {
        self.layouts[ty.0]
            .iter()
            .copied()
            .find(|id| self.member(*id).name == name)
    }

    fn identity(&self, ty: TypeId) -> Vec<MemberId> {
        self.layouts[ty.0]
            .iter()
            .copied()
            .filter(|id| self.member(*id).primary_key)
            .collect()
    }

    fn table_name(&self, root: TypeId) -> String {
        let def = &self.defs[root.0];
        let name = def
            .table
            .clone()
            .unwrap_or_else(|| Name::new(&def.name).snake_case());

        match &self.builder.table_name_prefix {
            Some(prefix) => format!("{prefix}{name}"),
            None => name,
        }
    }

    fn into_catalog(self) -> Catalog {
        let len = self.defs.len();

        let mut derived = vec![vec![]; len];
        for (index, ancestors) in self.ancestors.iter().enumerate() {
            if let Some(base) = ancestors.first() {
                derived[base.0].push(TypeId(index));
            }
        }

        let mut table_names: Vec<_> = (0..len)
            .map(|index| {
                let root = self.ancestors[index].last().copied().unwrap_or(TypeId(index));
                self.table_name(root)
            })
            .collect();

        let mut declared: Vec<Vec<Arc<Member>>> = self
            .declared
            .into_iter()
            .map(|members| members.into_iter().map(Arc::new).collect())
            .collect();

        // Subtypes share the `Arc`s of inherited members with their base.
        let mut members: Vec<Vec<Arc<Member>>> = vec![vec![]; len];
        for id in &self.order {
            let mut full = match self.ancestors[id.0].first() {
                Some(base) => members[base.0].clone(),
                None => vec![],
            };
            full.append(&mut declared[id.0]);
            members[id.0] = full;
        }

        let mut ancestors = self.ancestors;
        let mut codes = self.codes;
        let mut types = IndexMap::with_capacity(len);
        let mut by_name = IndexMap::with_capacity(len);

        for (index, def) in self.defs.into_iter().enumerate() {
            let id = TypeId(index);
            let ancestors = std::mem::take(&mut ancestors[index]);

            by_name.insert(def.name.clone(), id);
            types.insert(
                id,
                MetaType {
                    id,
                    name: def.name,
                    table_name: std::mem::take(&mut table_names[index]),
                    base: ancestors.first().copied(),
                    ancestors,
                    derived: std::mem::take(&mut derived[index]),
                    inheritance_code: codes[index].take(),
                    is_inheritance_default: def.is_inheritance_default,
                    members: std::mem::take(&mut members[index]),
                },
            );
        }

        Catalog { types, by_name }
    }
}

//! `PostgreSQL` repository implementation for MCP instances.

use super::{
    models::{McpInstanceRow, NewMcpInstanceRow},
    schema::mcp_instances,
};
use crate::instance::{
    domain::{
        AccessType, HostedContainer, InstanceName, InstanceStatus, McpInstance, McpInstanceId,
        McpProtocol, PersistedMcpInstanceData,
    },
    ports::{InstanceRepositoryError, InstanceRepositoryResult, McpInstanceRepository},
};
use async_trait::async_trait;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::result::{DatabaseErrorKind, Error as DieselError};

/// `PostgreSQL` connection pool type for MCP instance adapters.
pub type InstancePgPool = Pool<ConnectionManager<PgConnection>>;

/// `PostgreSQL`-backed repository for MCP instance records.
#[derive(Debug, Clone)]
pub struct PostgresMcpInstanceRepository {
    pool: InstancePgPool,
}

impl PostgresMcpInstanceRepository {
    /// Creates a new repository from a `PostgreSQL` pool.
    #[must_use]
    pub const fn new(pool: InstancePgPool) -> Self {
        Self { pool }
    }

    async fn run_blocking<F, T>(&self, operation: F) -> InstanceRepositoryResult<T>
    where
        F: FnOnce(&mut PgConnection) -> InstanceRepositoryResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut connection = pool.get().map_err(InstanceRepositoryError::persistence)?;
            operation(&mut connection)
        })
        .await
        .map_err(InstanceRepositoryError::persistence)?
    }
}

#[async_trait]
impl McpInstanceRepository for PostgresMcpInstanceRepository {
    async fn create(&self, instance: &McpInstance) -> InstanceRepositoryResult<()> {
        let instance_id = instance.id();
        let instance_name = instance.name().clone();
        let new_row = to_row(instance)?;

        self.run_blocking(move |connection| {
            diesel::insert_into(mcp_instances::table)
                .values(&new_row)
                .execute(connection)
                .map_err(|err| match err {
                    DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, ref info)
                        if is_name_unique_violation(info.as_ref()) =>
                    {
                        InstanceRepositoryError::DuplicateInstanceName(instance_name.clone())
                    }
                    DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
                        InstanceRepositoryError::DuplicateInstance(instance_id)
                    }
                    _ => InstanceRepositoryError::persistence(err),
                })?;
            Ok(())
        })
        .await
    }

    async fn update(&self, instance: &McpInstance) -> InstanceRepositoryResult<()> {
        let instance_id = instance.id();
        let instance_name = instance.name().clone();
        let changes = to_row(instance)?;

        self.run_blocking(move |connection| {
            let updated_count = diesel::update(
                mcp_instances::table.filter(mcp_instances::id.eq(instance_id.into_inner())),
            )
            .set(&changes)
            .execute(connection)
            .map_err(|err| match err {
                DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, ref info)
                    if is_name_unique_violation(info.as_ref()) =>
                {
                    InstanceRepositoryError::DuplicateInstanceName(instance_name.clone())
                }
                _ => InstanceRepositoryError::persistence(err),
            })?;

            if updated_count == 0 {
                return Err(InstanceRepositoryError::NotFound(instance_id));
            }
            Ok(())
        })
        .await
    }

    async fn delete(&self, instance_id: McpInstanceId) -> InstanceRepositoryResult<()> {
        self.run_blocking(move |connection| {
            let deleted_count = diesel::delete(
                mcp_instances::table.filter(mcp_instances::id.eq(instance_id.into_inner())),
            )
            .execute(connection)
            .map_err(InstanceRepositoryError::persistence)?;

            if deleted_count == 0 {
                return Err(InstanceRepositoryError::NotFound(instance_id));
            }
            Ok(())
        })
        .await
    }

    async fn find_by_id(
        &self,
        instance_id: McpInstanceId,
    ) -> InstanceRepositoryResult<Option<McpInstance>> {
        self.run_blocking(move |connection| {
            let row = mcp_instances::table
                .filter(mcp_instances::id.eq(instance_id.into_inner()))
                .select(McpInstanceRow::as_select())
                .first::<McpInstanceRow>(connection)
                .optional()
                .map_err(InstanceRepositoryError::persistence)?;
            row.map(row_to_instance).transpose()
        })
        .await
    }

    async fn find_by_name(
        &self,
        name: &InstanceName,
    ) -> InstanceRepositoryResult<Option<McpInstance>> {
        let lookup = name.as_str().to_owned();
        self.run_blocking(move |connection| {
            let row = mcp_instances::table
                .filter(mcp_instances::name.eq(&lookup))
                .select(McpInstanceRow::as_select())
                .first::<McpInstanceRow>(connection)
                .optional()
                .map_err(InstanceRepositoryError::persistence)?;
            row.map(row_to_instance).transpose()
        })
        .await
    }

    async fn list_all(&self) -> InstanceRepositoryResult<Vec<McpInstance>> {
        self.run_blocking(move |connection| {
            let rows = mcp_instances::table
                .order((mcp_instances::created_at.asc(), mcp_instances::id.asc()))
                .select(McpInstanceRow::as_select())
                .load::<McpInstanceRow>(connection)
                .map_err(InstanceRepositoryError::persistence)?;
            rows.into_iter().map(row_to_instance).collect()
        })
        .await
    }
}

fn to_row(instance: &McpInstance) -> InstanceRepositoryResult<NewMcpInstanceRow> {
    let hosting = instance
        .container()
        .map(serde_json::to_value)
        .transpose()
        .map_err(InstanceRepositoryError::persistence)?;

    Ok(NewMcpInstanceRow {
        id: instance.id().into_inner(),
        name: instance.name().as_str().to_owned(),
        access_type: instance.access_type().as_str().to_owned(),
        mcp_protocol: instance.mcp_protocol().as_str().to_owned(),
        source_config: instance.source_config().clone(),
        target_config: instance.target_config().clone(),
        public_proxy_config: instance.public_proxy_config().clone(),
        status: instance.status().as_str().to_owned(),
        hosting,
        status_message: instance.status_message().map(str::to_owned),
        created_at: instance.created_at(),
        updated_at: instance.updated_at(),
    })
}

fn row_to_instance(row: McpInstanceRow) -> InstanceRepositoryResult<McpInstance> {
    let McpInstanceRow {
        id,
        name,
        access_type,
        mcp_protocol,
        source_config,
        target_config,
        public_proxy_config,
        status,
        hosting,
        status_message,
        created_at,
        updated_at,
    } = row;

    let parsed_name = InstanceName::new(name).map_err(InstanceRepositoryError::invalid_persisted_data)?;
    let parsed_access = AccessType::try_from(access_type.as_str())
        .map_err(InstanceRepositoryError::invalid_persisted_data)?;
    let parsed_protocol = McpProtocol::try_from(mcp_protocol.as_str())
        .map_err(InstanceRepositoryError::invalid_persisted_data)?;
    let parsed_status = InstanceStatus::try_from(status.as_str())
        .map_err(InstanceRepositoryError::invalid_persisted_data)?;
    let container = hosting
        .map(serde_json::from_value::<HostedContainer>)
        .transpose()
        .map_err(InstanceRepositoryError::invalid_persisted_data)?;

    Ok(McpInstance::from_persisted(PersistedMcpInstanceData {
        id: McpInstanceId::from_uuid(id),
        name: parsed_name,
        access_type: parsed_access,
        mcp_protocol: parsed_protocol,
        source_config,
        target_config,
        public_proxy_config,
        status: parsed_status,
        container,
        status_message,
        created_at,
        updated_at,
    }))
}

fn is_name_unique_violation(info: &dyn diesel::result::DatabaseErrorInformation) -> bool {
    info.constraint_name()
        .is_some_and(|name| name == "idx_mcp_instances_name")
}

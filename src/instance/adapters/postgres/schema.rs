//! Diesel schema for MCP instance persistence.

diesel::table! {
    /// MCP instance records.
    mcp_instances (id) {
        /// Instance identifier.
        id -> Uuid,
        /// Unique instance name.
        #[max_length = 100]
        name -> Varchar,
        /// Access mode (`direct`, `proxy`, `hosting`).
        #[max_length = 20]
        access_type -> Varchar,
        /// Declared protocol (`stdio`, `sse`, `streamable_http`).
        #[max_length = 32]
        mcp_protocol -> Varchar,
        /// Configuration as submitted.
        source_config -> Jsonb,
        /// Derived routing configuration.
        target_config -> Jsonb,
        /// Derived client-facing configuration.
        public_proxy_config -> Jsonb,
        /// Enabled state (`active`, `inactive`).
        #[max_length = 20]
        status -> Varchar,
        /// Hosting settings and container state of hosted instances.
        hosting -> Nullable<Jsonb>,
        /// Latest explanatory status message.
        status_message -> Nullable<Text>,
        /// Creation timestamp.
        created_at -> Timestamptz,
        /// Last update timestamp.
        updated_at -> Timestamptz,
    }
}

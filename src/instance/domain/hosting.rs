//! Hosting settings for platform-run MCP server containers.

use super::{
    ContainerStatus, ContainerStatusReport, EnvironmentId, InstanceDomainError,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::ops::RangeInclusive;
use std::time::Duration;

/// Accepted non-zero startup timeout, in seconds.
pub const STARTUP_TIMEOUT_RANGE: RangeInclusive<u32> = 30..=3600;

/// Accepted non-zero running timeout, in seconds.
pub const RUNNING_TIMEOUT_RANGE: RangeInclusive<u32> = 60..=86_400;

/// Startup and running time limits of a hosted container.
///
/// Zero means the platform default applies.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HostingTimeouts {
    startup_timeout: u32,
    running_timeout: u32,
}

impl HostingTimeouts {
    /// Creates validated timeouts.
    ///
    /// # Errors
    ///
    /// Returns [`InstanceDomainError::StartupTimeoutOutOfRange`] or
    /// [`InstanceDomainError::RunningTimeoutOutOfRange`] when a non-zero value
    /// falls outside its range.
    pub fn new(startup_timeout: u32, running_timeout: u32) -> Result<Self, InstanceDomainError> {
        if startup_timeout != 0 && !STARTUP_TIMEOUT_RANGE.contains(&startup_timeout) {
            return Err(InstanceDomainError::StartupTimeoutOutOfRange(startup_timeout));
        }
        if running_timeout != 0 && !RUNNING_TIMEOUT_RANGE.contains(&running_timeout) {
            return Err(InstanceDomainError::RunningTimeoutOutOfRange(running_timeout));
        }
        Ok(Self {
            startup_timeout,
            running_timeout,
        })
    }

    /// Returns the startup timeout in seconds.
    #[must_use]
    pub const fn startup_secs(self) -> u32 {
        self.startup_timeout
    }

    /// Returns the running timeout in seconds.
    #[must_use]
    pub const fn running_secs(self) -> u32 {
        self.running_timeout
    }

    /// Returns the startup limit, or `None` for the platform default.
    #[must_use]
    pub fn startup_limit(self) -> Option<Duration> {
        (self.startup_timeout != 0).then(|| Duration::from_secs(u64::from(self.startup_timeout)))
    }

    /// Returns the running limit, or `None` when unlimited.
    #[must_use]
    pub fn running_limit(self) -> Option<Duration> {
        (self.running_timeout != 0).then(|| Duration::from_secs(u64::from(self.running_timeout)))
    }
}

/// Volume mounted into a hosted container.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VolumeMount {
    /// Source volume or host path.
    pub source: String,
    /// Path inside the container.
    pub mount_path: String,
    /// Whether the mount is read-only.
    #[serde(default)]
    pub read_only: bool,
}

/// Unvalidated hosting settings as supplied by the caller.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HostingSettings {
    /// Target deployment environment.
    pub environment_id: i64,
    /// Code bundle reference.
    pub package_id: Option<String>,
    /// Port the server listens on inside the container.
    pub port: u16,
    /// Command overriding the image entrypoint.
    pub command: Option<String>,
    /// Script run before the server starts.
    pub init_script: Option<String>,
    /// Container image.
    pub image_address: String,
    /// Environment variables set on the container.
    pub environment_variables: BTreeMap<String, String>,
    /// Volumes mounted into the container.
    pub volume_mounts: Vec<VolumeMount>,
    /// Startup timeout in seconds.
    pub startup_timeout: u32,
    /// Running timeout in seconds.
    pub running_timeout: u32,
    /// Access tokens attached to the public endpoint.
    pub tokens: Vec<String>,
}

/// Validated hosting settings of an instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HostingSpec {
    environment_id: EnvironmentId,
    package_id: Option<String>,
    port: u16,
    command: Option<String>,
    init_script: Option<String>,
    image_address: String,
    environment_variables: BTreeMap<String, String>,
    volume_mounts: Vec<VolumeMount>,
    timeouts: HostingTimeouts,
    tokens: Vec<String>,
}

impl TryFrom<HostingSettings> for HostingSpec {
    type Error = InstanceDomainError;

    /// Validates port, environment, image and timeouts in that order.
    fn try_from(settings: HostingSettings) -> Result<Self, Self::Error> {
        if settings.port == 0 {
            return Err(InstanceDomainError::InvalidPort);
        }
        let environment_id = EnvironmentId::new(settings.environment_id)?;
        let image_address = settings.image_address.trim().to_owned();
        if image_address.is_empty() {
            return Err(InstanceDomainError::EmptyImageAddress);
        }
        let timeouts = HostingTimeouts::new(settings.startup_timeout, settings.running_timeout)?;
        if settings
            .volume_mounts
            .iter()
            .any(|mount| mount.mount_path.trim().is_empty())
        {
            return Err(InstanceDomainError::EmptyVolumeMountPath);
        }

        Ok(Self {
            environment_id,
            package_id: trimmed_option(settings.package_id),
            port: settings.port,
            command: trimmed_option(settings.command),
            init_script: trimmed_option(settings.init_script),
            image_address,
            environment_variables: settings.environment_variables,
            volume_mounts: settings.volume_mounts,
            timeouts,
            tokens: settings
                .tokens
                .into_iter()
                .filter(|token| !token.trim().is_empty())
                .collect(),
        })
    }
}

impl HostingSpec {
    /// Returns the deployment environment.
    #[must_use]
    pub const fn environment_id(&self) -> EnvironmentId {
        self.environment_id
    }

    /// Returns the code bundle reference.
    #[must_use]
    pub fn package_id(&self) -> Option<&str> {
        self.package_id.as_deref()
    }

    /// Returns the container port.
    #[must_use]
    pub const fn port(&self) -> u16 {
        self.port
    }

    /// Returns the caller-supplied command override.
    #[must_use]
    pub fn command(&self) -> Option<&str> {
        self.command.as_deref()
    }

    /// Returns the init script.
    #[must_use]
    pub fn init_script(&self) -> Option<&str> {
        self.init_script.as_deref()
    }

    /// Returns the container image.
    #[must_use]
    pub fn image_address(&self) -> &str {
        &self.image_address
    }

    /// Returns container environment variables.
    #[must_use]
    pub const fn environment_variables(&self) -> &BTreeMap<String, String> {
        &self.environment_variables
    }

    /// Returns volume mounts.
    #[must_use]
    pub fn volume_mounts(&self) -> &[VolumeMount] {
        &self.volume_mounts
    }

    /// Returns the container time limits.
    #[must_use]
    pub const fn timeouts(&self) -> HostingTimeouts {
        self.timeouts
    }

    /// Returns the public endpoint access tokens.
    #[must_use]
    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    /// Returns whether the image belongs to one of the given runtime image
    /// prefixes.
    #[must_use]
    pub fn uses_runtime_image<S: AsRef<str>>(&self, runtime_images: &[S]) -> bool {
        runtime_images
            .iter()
            .any(|prefix| self.image_address.starts_with(prefix.as_ref()))
    }
}

fn trimmed_option(value: Option<String>) -> Option<String> {
    value
        .map(|text| text.trim().to_owned())
        .filter(|text| !text.is_empty())
}

/// Container state tracked on a hosted instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HostedContainer {
    spec: HostingSpec,
    container_name: String,
    service_name: String,
    container_status: ContainerStatus,
    container_is_ready: bool,
    #[serde(default)]
    generation: u32,
}

impl HostedContainer {
    /// Creates the state of a freshly requested container.
    #[must_use]
    pub fn pending(
        spec: HostingSpec,
        container_name: impl Into<String>,
        service_name: impl Into<String>,
    ) -> Self {
        Self {
            spec,
            container_name: container_name.into(),
            service_name: service_name.into(),
            container_status: ContainerStatus::Pending,
            container_is_ready: false,
            generation: 0,
        }
    }

    /// Sets the deployment generation.
    #[must_use]
    pub const fn with_generation(mut self, generation: u32) -> Self {
        self.generation = generation;
        self
    }

    /// Returns the hosting settings.
    #[must_use]
    pub const fn spec(&self) -> &HostingSpec {
        &self.spec
    }

    /// Returns the orchestrator container name.
    #[must_use]
    pub fn container_name(&self) -> &str {
        &self.container_name
    }

    /// Returns the in-cluster service name.
    #[must_use]
    pub fn service_name(&self) -> &str {
        &self.service_name
    }

    /// Returns the container status.
    #[must_use]
    pub const fn container_status(&self) -> ContainerStatus {
        self.container_status
    }

    /// Returns whether the container passed its startup probe.
    #[must_use]
    pub const fn container_is_ready(&self) -> bool {
        self.container_is_ready
    }

    /// Returns the deployment generation.
    ///
    /// Every redeploy uses the next generation so that the replacement
    /// container can run alongside the one it replaces.
    #[must_use]
    pub const fn generation(&self) -> u32 {
        self.generation
    }

    /// Returns the generation of the next redeploy.
    #[must_use]
    pub const fn next_generation(&self) -> u32 {
        self.generation.saturating_add(1)
    }

    pub(crate) const fn reset_to_pending(&mut self) {
        self.container_status = ContainerStatus::Pending;
        self.container_is_ready = false;
    }

    /// Applies a coordinator report, returning whether anything changed.
    pub(crate) fn apply_report(&mut self, report: &ContainerStatusReport) -> bool {
        let changed = self.container_status != report.status()
            || self.container_is_ready != report.is_ready();
        self.container_status = report.status();
        self.container_is_ready = report.is_ready();
        changed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn settings() -> HostingSettings {
        HostingSettings {
            environment_id: 1,
            port: 8000,
            image_address: "registry.local/mcp/runtime:1".to_owned(),
            ..HostingSettings::default()
        }
    }

    #[rstest]
    #[case(0, true)]
    #[case(29, false)]
    #[case(30, true)]
    #[case(3600, true)]
    #[case(3601, false)]
    fn startup_timeout_boundaries(#[case] value: u32, #[case] accepted: bool) {
        let result = HostingTimeouts::new(value, 0);
        assert_eq!(result.is_ok(), accepted);
        if !accepted {
            assert_eq!(
                result,
                Err(InstanceDomainError::StartupTimeoutOutOfRange(value))
            );
        }
    }

    #[rstest]
    #[case(0, true)]
    #[case(59, false)]
    #[case(60, true)]
    #[case(86_400, true)]
    #[case(86_401, false)]
    fn running_timeout_boundaries(#[case] value: u32, #[case] accepted: bool) {
        let result = HostingTimeouts::new(0, value);
        assert_eq!(result.is_ok(), accepted);
        if !accepted {
            assert_eq!(
                result,
                Err(InstanceDomainError::RunningTimeoutOutOfRange(value))
            );
        }
    }

    #[test]
    fn zero_timeouts_mean_platform_default() {
        let timeouts = HostingTimeouts::new(0, 0).expect("zero timeouts are valid");
        assert_eq!(timeouts.startup_limit(), None);
        assert_eq!(timeouts.running_limit(), None);
    }

    #[rstest]
    #[case(HostingSettings { port: 0, ..settings() }, InstanceDomainError::InvalidPort)]
    #[case(HostingSettings { environment_id: 0, ..settings() }, InstanceDomainError::InvalidEnvironmentId(0))]
    #[case(HostingSettings { image_address: "  ".to_owned(), ..settings() }, InstanceDomainError::EmptyImageAddress)]
    #[case(HostingSettings { startup_timeout: 10, ..settings() }, InstanceDomainError::StartupTimeoutOutOfRange(10))]
    fn invalid_settings_are_rejected(
        #[case] input: HostingSettings,
        #[case] expected: InstanceDomainError,
    ) {
        assert_eq!(HostingSpec::try_from(input), Err(expected));
    }

    #[test]
    fn blank_optional_values_are_dropped() {
        let spec = HostingSpec::try_from(HostingSettings {
            command: Some("   ".to_owned()),
            tokens: vec![String::new(), "secret".to_owned()],
            ..settings()
        })
        .expect("settings should validate");

        assert_eq!(spec.command(), None);
        assert_eq!(spec.tokens(), ["secret".to_owned()]);
    }

    #[test]
    fn runtime_image_matches_by_prefix() {
        let spec = HostingSpec::try_from(settings()).expect("settings should validate");
        assert!(spec.uses_runtime_image(&["registry.local/mcp/runtime"]));
        assert!(!spec.uses_runtime_image(&["docker.io/other"]));
    }

    #[test]
    fn records_without_generation_start_at_zero() {
        let spec = HostingSpec::try_from(settings()).expect("settings should validate");
        let mut stored = serde_json::to_value(
            HostedContainer::pending(spec, "mcp-a", "mcp-svc-a").with_generation(3),
        )
        .expect("container should serialize");
        assert_eq!(stored["generation"], serde_json::json!(3));
        if let Some(fields) = stored.as_object_mut() {
            fields.remove("generation");
        }

        let container: HostedContainer =
            serde_json::from_value(stored).expect("older records should deserialize");

        assert_eq!(container.generation(), 0);
        assert_eq!(container.next_generation(), 1);
    }
}

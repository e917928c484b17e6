crate::define_triage_enum! {
    /// Root-cause category assigned to a failed run
    Category {
        KnownFlake => "Known Flake",
        InfraError => "Infrastructure Error",
        ProductBug => "New Product Bug",
        SetupFailure => "Setup Failure",
        AnsibleDeployFailure => "Ansible Deploy Failure",
        OcpMysqlValidationFailure => "ocp-mysql-validation-failure",
        OcpMysqlCleanupFailure => "ocp-mysql-cleanup-failure",
        OcpMysqlDeployFailure => "ocp-mysql-deploy-failure",
        BackupIntegrityFailure => "Backup Integrity Failure",
        BackupPartiallyFailed => "backup-partially-failed",
        BackupSuccessful => "backup-successful",
        /// Run excluded because the environment was unstable
        Skip => "skip",
        /// Run excluded because the feature under test is switched off
        NewSkip => "new-skip",
        NeedsManualReview => "Needs Manual Review",
    }
}

impl Category {
    /// Categories that exclude a run from triage altogether.
    pub fn is_skip(&self) -> bool {
        matches!(self, Category::Skip | Category::NewSkip)
    }
}

use crate::model::RunSubmission;

const ANSIBLE_LOG: &str = r#"Error during command execution: ansible-playbook error: one or more host failed... use_role\":\".../roles/ocp-mysql-deploy\""#;

const BACKUP_VERIFY_LOG: &str = "STEP: Setting up environment\n\
STEP: Deploying application stack\n\
STEP: Running backup for mysql-persistent\n\
STEP: Verify backup integrity\n\
FAIL: Checksum mismatch for file /backup/data/db.sql";

const VM_PROVISIONING_LOG: &str =
    "STEP: Launching new VM\nERROR: Request failed, permission denied when creating security group.";

const PARTIAL_BACKUP_LOG: &str = "STEP: Starting backup\n\
backup successful\n\
WARN: backup completed with warnings\n\
ERROR: Connection timed out";

const CLEANUP_LOG: &str = "STEP: Validating application after restore\n\
STEP: Tearing down test resources\n\
ERROR: mysql cleanup failed";

struct DemoRun {
    test_name: &'static str,
    suite: &'static str,
    build_id: &'static str,
    environment: &'static str,
    logs: &'static str,
    version: &'static str,
    repository: &'static str,
    platform: &'static str,
    tags: &'static [&'static str],
}

const DEMO_RUNS: &[DemoRun] = &[
    DemoRun {
        test_name: "test_user_login_timeout",
        suite: "Auth",
        build_id: "build-501",
        environment: "staging",
        logs: "ERROR: Connection timed out to auth-service",
        version: "1.2.3",
        repository: "stage",
        platform: "AWS_GCP",
        tags: &["smoke"],
    },
    DemoRun {
        test_name: "test_calculate_invoice",
        suite: "Billing",
        build_id: "build-501",
        environment: "staging",
        logs: "FATAL: java.lang.NullPointerException",
        version: "1.2.3",
        repository: "stage",
        platform: "AWS_GCP",
        tags: &["p0"],
    },
    DemoRun {
        test_name: "test_api_create_user",
        suite: "API",
        build_id: "build-502",
        environment: "prod",
        logs: "ERROR: Failed during database migration setup",
        version: "1.2.4",
        repository: "prestage",
        platform: "GCP_KUBEVIRT",
        tags: &["smoke"],
    },
    DemoRun {
        test_name: "test_full_checkout_multi_error",
        suite: "E2E",
        build_id: "build-503",
        environment: "staging",
        logs: "WARN: Connection timed out... FATAL: NullPointerException",
        version: "1.3.0",
        repository: "stage",
        platform: "AZURE",
        tags: &["p1", "critical"],
    },
    DemoRun {
        test_name: "test_report_generation_perms",
        suite: "Reporting",
        build_id: "build-504",
        environment: "prod",
        logs: "ERROR: Permission denied for user 'reporter' to database.",
        version: "1.3.1",
        repository: "main",
        platform: "AWS_RDS",
        tags: &["p2"],
    },
    DemoRun {
        test_name: "test_ansible_role_deploy",
        suite: "Deployment",
        build_id: "build-505",
        environment: "ci",
        logs: ANSIBLE_LOG,
        version: "1.4.0",
        repository: "main",
        platform: "OCP_BAREMETAL",
        tags: &["deployment"],
    },
    DemoRun {
        test_name: "test_mysql_backup_validation",
        suite: "Backup",
        build_id: "build-506",
        environment: "ci",
        logs: "mysql validation failed",
        version: "1.4.0",
        repository: "main",
        platform: "OCP_BAREMETAL",
        tags: &["db"],
    },
    DemoRun {
        test_name: "test_mysql_backup_and_verify",
        suite: "DB-Backup",
        build_id: "build-507",
        environment: "prod",
        logs: BACKUP_VERIFY_LOG,
        version: "1.4.1",
        repository: "main",
        platform: "GCP",
        tags: &["db", "critical"],
    },
    DemoRun {
        test_name: "test_mysql_validation_with_perms",
        suite: "DB-Restore",
        build_id: "build-508",
        environment: "dev",
        logs: "STEP: Validating application after restore\nERROR: mysql validation failed due to permission denied on /data",
        version: "1.4.1",
        repository: "dev-branch",
        platform: "AWS",
        tags: &["db"],
    },
    DemoRun {
        test_name: "test_partial_backup_flake",
        suite: "DB-Backup",
        build_id: "build-509",
        environment: "staging",
        logs: PARTIAL_BACKUP_LOG,
        version: "1.4.1",
        repository: "stage",
        platform: "GCP",
        tags: &["db"],
    },
    DemoRun {
        test_name: "test_successful_backup_cleanup_fail",
        suite: "DB-Backup",
        build_id: "build-510",
        environment: "prod",
        logs: CLEANUP_LOG,
        version: "1.4.2",
        repository: "main",
        platform: "AZURE",
        tags: &["db"],
    },
    DemoRun {
        test_name: "test_ocp_mysql_deploy_failure",
        suite: "Deployment",
        build_id: "build-511",
        environment: "ci",
        logs: "STEP: Deploying ocp-mysql\nERROR: ocp-mysql deploy failed",
        version: "1.4.2",
        repository: "main",
        platform: "OCP",
        tags: &["db"],
    },
    DemoRun {
        test_name: "test_vm_provisioning_error",
        suite: "Infra",
        build_id: "build-511",
        environment: "ci",
        logs: VM_PROVISIONING_LOG,
        version: "1.5.0",
        repository: "main",
        platform: "vSphere",
        tags: &["provisioning"],
    },
    DemoRun {
        test_name: "test_infra_setup_failure",
        suite: "Setup",
        build_id: "build-512",
        environment: "ci",
        logs: "STEP: Provisioning network\nFATAL: database migration setup failed",
        version: "1.4.2",
        repository: "main",
        platform: "OCP",
        tags: &["infra"],
    },
    DemoRun {
        test_name: "test_feature_x_flow",
        suite: "Feature-Flags",
        build_id: "build-513",
        environment: "dev",
        logs: "STEP: Checking feature flag\nINFO: Skipping test, feature flag is disabled",
        version: "1.5.0",
        repository: "feature-x",
        platform: "KIND",
        tags: &["feature-toggle"],
    },
    DemoRun {
        test_name: "test_e2e_on_unstable_env",
        suite: "E2E-Infra",
        build_id: "build-514",
        environment: "ci",
        logs: "WARN: Test skipped due to unstable environment",
        version: "1.5.0",
        repository: "main",
        platform: "OCP",
        tags: &["infra", "skip"],
    },
];

/// Showcase batch covering every classification path.
pub fn demo_submissions() -> Vec<RunSubmission> {
    DEMO_RUNS
        .iter()
        .map(|run| {
            RunSubmission::new(run.test_name, run.logs)
                .with_suite(run.suite)
                .with_build(run.build_id, run.environment)
                .with_source(run.version, run.repository, run.platform)
                .with_tags(run.tags.iter().copied())
        })
        .collect()
}

// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unit tests for site configuration

#[cfg(test)]
mod tests {
    use crate::config::SiteConfig;
    use crate::errors::ConfigError;
    use std::io::Write;

    // ========================================================================
    // Defaults
    // ========================================================================

    #[test]
    fn test_default_config_resolves() {
        let settings = SiteConfig::default().resolve().unwrap();

        assert_eq!(settings.stack_name, "WebsiteInfraStack");
        assert_eq!(settings.domain_name, "example.org");
        assert_eq!(settings.region, None);
        assert_eq!(settings.content_bucket_name, "static-example-org");
        assert_eq!(settings.logging_bucket_name, "logging-example-org");
        assert_eq!(settings.default_ttl_secs, 900);
        assert_eq!(settings.min_ttl_secs, 60);
        assert_eq!(settings.root_object, "index.html");
        assert_eq!(settings.log_version, "v0");
    }

    #[test]
    fn test_derived_values() {
        let settings = SiteConfig::for_domain("example.org").resolve().unwrap();

        assert_eq!(settings.certificate_domain(), "*.example.org");
        assert_eq!(settings.zone_fqdn(), "example.org.");
        assert_eq!(settings.log_prefix(), "logs/example.org/v0/");
        assert_eq!(settings.root_document_path(), "/index.html");
        assert_eq!(
            settings.subject_alternative_names,
            vec!["example.org".to_string(), "www.example.org".to_string()]
        );
    }

    #[test]
    fn test_domain_is_normalized() {
        let settings = SiteConfig::for_domain("Example.ORG.").resolve().unwrap();
        assert_eq!(settings.domain_name, "example.org");
        assert_eq!(settings.content_bucket_name, "static-example-org");
    }

    // ========================================================================
    // YAML Loading
    // ========================================================================

    #[test]
    fn test_from_yaml_overrides_defaults() {
        let yaml = r"
stackName: AaronSite
domainName: aarondrinksjava.com
region: eu-west-1
contentBucketName: static-aarondrinksjava-com
loggingBucketName: logging-aaron-t-w
defaultTtl: 30m
extraSubjectAlternativeNames:
  - cake.aarondrinksjava.com
";
        let config = SiteConfig::from_yaml_str(yaml, "inline").unwrap();
        assert_eq!(config.min_ttl, "1m", "unset fields keep their defaults");

        let settings = config.resolve().unwrap();
        assert_eq!(settings.stack_name, "AaronSite");
        assert_eq!(settings.region.as_deref(), Some("eu-west-1"));
        assert_eq!(settings.logging_bucket_name, "logging-aaron-t-w");
        assert_eq!(settings.default_ttl_secs, 1800);
        assert_eq!(
            settings.subject_alternative_names,
            vec![
                "aarondrinksjava.com".to_string(),
                "www.aarondrinksjava.com".to_string(),
                "cake.aarondrinksjava.com".to_string(),
            ]
        );
    }

    #[test]
    fn test_empty_yaml_is_default() {
        let config = SiteConfig::from_yaml_str("{}", "inline").unwrap();
        assert_eq!(config, SiteConfig::default());
    }

    #[test]
    fn test_unknown_field_is_rejected() {
        let err = SiteConfig::from_yaml_str("domainName: example.org\nbogus: 1\n", "site.yaml")
            .unwrap_err();
        assert!(matches!(err, ConfigError::Parse { ref path, .. } if path == "site.yaml"));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "domainName: example.net").unwrap();

        let config = SiteConfig::load(file.path()).unwrap();
        assert_eq!(config.domain_name, "example.net");
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = SiteConfig::load(&dir.path().join("missing.yaml")).unwrap_err();
        assert_eq!(err.reason(), "ConfigReadFailed");
    }

    #[test]
    fn test_yaml_round_trip_skips_unset_options() {
        let yaml = serde_yaml::to_string(&SiteConfig::default()).unwrap();
        assert!(!yaml.contains("region"));
        assert!(!yaml.contains("contentBucketName"));
        assert!(yaml.contains("domainName: example.org"));
    }

    // ========================================================================
    // Validation Failures
    // ========================================================================

    #[test]
    fn test_invalid_domains() {
        for domain in ["", "localhost", "*.example.org", "-bad.example.org", "bad_label.org"] {
            let err = SiteConfig::for_domain(domain).resolve().unwrap_err();
            assert!(
                matches!(err, ConfigError::InvalidDomain { .. }),
                "{domain:?} should be rejected, got {err:?}"
            );
        }
    }

    #[test]
    fn test_invalid_stack_names() {
        for stack_name in ["", "1stack", "my_stack", "stack name"] {
            let config = SiteConfig {
                stack_name: stack_name.into(),
                ..SiteConfig::default()
            };
            assert_eq!(config.validate().unwrap_err().reason(), "InvalidStackName");
        }
    }

    #[test]
    fn test_invalid_bucket_names() {
        for bucket in ["ab", "Static-Site", "static_site", "-static", "static..site", "192.168.1.1"] {
            let config = SiteConfig {
                content_bucket_name: Some(bucket.into()),
                ..SiteConfig::default()
            };
            let err = config.resolve().unwrap_err();
            assert!(
                matches!(err, ConfigError::InvalidBucketName { .. }),
                "{bucket:?} should be rejected, got {err:?}"
            );
        }
    }

    #[test]
    fn test_same_bucket_for_content_and_logs_is_rejected() {
        let config = SiteConfig {
            content_bucket_name: Some("shared-bucket".into()),
            logging_bucket_name: Some("shared-bucket".into()),
            ..SiteConfig::default()
        };
        assert_eq!(config.validate().unwrap_err().reason(), "InvalidBucketName");
    }

    #[test]
    fn test_invalid_ttl() {
        let config = SiteConfig {
            default_ttl: "15 minutes".into(),
            ..SiteConfig::default()
        };
        let err = config.resolve().unwrap_err();
        assert!(matches!(err, ConfigError::InvalidTtl { ref field, .. } if field == "defaultTtl"));
    }

    #[test]
    fn test_min_ttl_above_default_ttl() {
        let config = SiteConfig {
            default_ttl: "60s".into(),
            min_ttl: "2m".into(),
            ..SiteConfig::default()
        };
        let err = config.resolve().unwrap_err();
        assert!(matches!(
            err,
            ConfigError::TtlOrdering {
                min_secs: 120,
                default_secs: 60
            }
        ));
    }

    #[test]
    fn test_equal_ttls_are_accepted() {
        let config = SiteConfig {
            default_ttl: "60s".into(),
            min_ttl: "1m".into(),
            ..SiteConfig::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_invalid_root_object() {
        for root_object in ["", "/index.html", "my index.html"] {
            let config = SiteConfig {
                root_object: root_object.into(),
                ..SiteConfig::default()
            };
            assert_eq!(config.validate().unwrap_err().reason(), "InvalidRootObject");
        }
    }

    #[test]
    fn test_invalid_log_version() {
        for log_version in ["", "v0/extra", "v 0"] {
            let config = SiteConfig {
                log_version: log_version.into(),
                ..SiteConfig::default()
            };
            assert_eq!(config.validate().unwrap_err().reason(), "InvalidLogVersion");
        }
    }

    #[test]
    fn test_extra_san_outside_zone_is_rejected() {
        let config = SiteConfig {
            extra_subject_alternative_names: vec!["cake.example.net".into()],
            ..SiteConfig::default()
        };
        let err = config.resolve().unwrap_err();
        assert!(matches!(
            err,
            ConfigError::SubjectAlternativeNameOutsideZone { ref zone, .. } if zone == "example.org"
        ));
    }

    #[test]
    fn test_extra_sans_are_deduplicated() {
        let config = SiteConfig {
            extra_subject_alternative_names: vec![
                "www.example.org".into(),
                "*.example.org".into(),
                "Cake.Example.org.".into(),
                "cake.example.org".into(),
            ],
            ..SiteConfig::default()
        };
        let settings = config.resolve().unwrap();
        assert_eq!(
            settings.subject_alternative_names,
            vec![
                "example.org".to_string(),
                "www.example.org".to_string(),
                "cake.example.org".to_string(),
            ]
        );
    }

    // ========================================================================
    // Overrides
    // ========================================================================

    fn from_file() -> SiteConfig {
        SiteConfig::from_yaml_str(
            "stackName: FileStack\ndomainName: file.example.com\nregion: eu-west-1\n",
            "site.yaml",
        )
        .unwrap()
    }

    #[test]
    fn test_overrides_beat_file_values() {
        let config = from_file().with_overrides(
            Some("env.example.net"),
            Some("us-west-2"),
            Some("FlagStack"),
        );

        let settings = config.resolve().unwrap();
        assert_eq!(settings.domain_name, "env.example.net");
        assert_eq!(settings.region.as_deref(), Some("us-west-2"));
        assert_eq!(settings.stack_name, "FlagStack");
        assert_eq!(settings.content_bucket_name, "static-env-example-net");
    }

    #[test]
    fn test_unset_overrides_keep_file_values() {
        let config = from_file().with_overrides(None, None, None);
        assert_eq!(config, from_file());

        let partial = from_file().with_overrides(Some("env.example.net"), None, None);
        assert_eq!(partial.domain_name, "env.example.net");
        assert_eq!(partial.region.as_deref(), Some("eu-west-1"));
        assert_eq!(partial.stack_name, "FileStack");
    }

    #[test]
    fn test_overrides_apply_over_defaults() {
        let config = SiteConfig::default().with_overrides(Some("example.net"), None, None);
        assert_eq!(config.resolve().unwrap().domain_name, "example.net");
        assert_eq!(config.stack_name, "WebsiteInfraStack");
    }

    // ========================================================================
    // Region and subject alternative names
    // ========================================================================

    #[test]
    fn test_invalid_regions() {
        for region in ["", "   ", "EU-WEST-1", "eu west 1", "-eu-west-1"] {
            let config = SiteConfig {
                region: Some(region.into()),
                ..SiteConfig::default()
            };
            let err = config.validate().unwrap_err();
            assert_eq!(err.reason(), "InvalidRegion", "region {region:?}");
        }
    }

    #[test]
    fn test_malformed_extra_sans_are_invalid_names() {
        for name in ["x_y.example.org", "-a.example.org", "a..example.org", "a.*.example.org"] {
            let config = SiteConfig {
                extra_subject_alternative_names: vec![name.into()],
                ..SiteConfig::default()
            };
            let err = config.resolve().unwrap_err();
            assert!(
                matches!(err, ConfigError::InvalidSubjectAlternativeName { name: ref n, .. } if n == name),
                "{name}: {err}"
            );
        }
    }

    #[test]
    fn test_wildcard_extra_san_inside_zone_is_accepted() {
        let config = SiteConfig {
            extra_subject_alternative_names: vec!["*.cake.example.org".into()],
            ..SiteConfig::default()
        };
        let settings = config.resolve().unwrap();
        assert_eq!(
            settings.subject_alternative_names.last().map(String::as_str),
            Some("*.cake.example.org")
        );
    }
}

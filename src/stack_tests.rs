// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unit tests for the static site declaration

#[cfg(test)]
mod tests {
    use crate::config::SiteConfig;
    use crate::errors::DeclarationError;
    use crate::model::{Expr, Relation, RemovalPolicy, ResourceKind};
    use crate::stack::{declare_site, SiteDeclaration, SiteResources};
    use hickory_proto::rr::RecordType;

    fn example_org() -> SiteDeclaration {
        declare_site(&SiteConfig::for_domain("example.org")).unwrap()
    }

    fn relations_of(site: &SiteDeclaration, id: &crate::model::LogicalId) -> Vec<(Relation, String)> {
        site.graph
            .edges()
            .iter()
            .filter(|e| &e.source == id)
            .map(|e| (e.relation, e.target.to_string()))
            .collect()
    }

    // ========================================================================
    // Graph Shape
    // ========================================================================

    #[test]
    fn test_declares_every_resource() {
        let site = example_org();
        assert_eq!(site.graph.len(), 9);

        let ids = &site.ids;
        for id in [
            &ids.hosted_zone,
            &ids.certificate,
            &ids.content_bucket,
            &ids.logging_bucket,
            &ids.origin_access_identity,
            &ids.content_bucket_policy,
            &ids.distribution,
            &ids.a_record,
            &ids.aaaa_record,
        ] {
            assert!(site.graph.get(id).is_some(), "{id} should be declared");
        }
    }

    #[test]
    fn test_every_reference_resolves() {
        let site = example_org();
        assert!(site.graph.validate().is_ok());
        for edge in site.graph.edges() {
            assert!(
                site.graph.get(&edge.target).is_some(),
                "{} -> {} is dangling",
                edge.source,
                edge.target
            );
        }
    }

    #[test]
    fn test_dependency_edges() {
        let site = example_org();
        let ids = &site.ids;

        assert_eq!(
            relations_of(&site, &ids.certificate),
            vec![(Relation::ValidatesAgainst, ids.hosted_zone.to_string())]
        );
        assert_eq!(
            relations_of(&site, &ids.content_bucket_policy),
            vec![
                (Relation::GrantsReadOn, ids.content_bucket.to_string()),
                (Relation::GrantsReadTo, ids.origin_access_identity.to_string()),
            ]
        );
        assert_eq!(
            relations_of(&site, &ids.distribution),
            vec![
                (Relation::Origin, ids.content_bucket.to_string()),
                (Relation::OriginIdentity, ids.origin_access_identity.to_string()),
                (Relation::ViewerCertificate, ids.certificate.to_string()),
                (Relation::AccessLogs, ids.logging_bucket.to_string()),
            ]
        );
        for record in [&ids.a_record, &ids.aaaa_record] {
            assert_eq!(
                relations_of(&site, record),
                vec![
                    (Relation::HostedIn, ids.hosted_zone.to_string()),
                    (Relation::AliasTarget, ids.distribution.to_string()),
                ]
            );
        }
        assert!(site.graph.dependencies_of(&ids.hosted_zone).is_empty());
        assert!(site.graph.dependencies_of(&ids.content_bucket).is_empty());
        assert!(site.graph.dependencies_of(&ids.logging_bucket).is_empty());
    }

    #[test]
    fn test_creation_waves_follow_dependency_order() {
        let site = example_org();
        let ids = &site.ids;
        let waves = site.graph.waves().unwrap();

        let wave_of = |id: &crate::model::LogicalId| {
            waves
                .iter()
                .position(|wave| wave.iter().any(|r| &r.logical_id == id))
                .unwrap()
        };

        assert_eq!(wave_of(&ids.hosted_zone), 0);
        assert_eq!(wave_of(&ids.content_bucket), 0);
        assert_eq!(wave_of(&ids.logging_bucket), 0);
        assert_eq!(wave_of(&ids.origin_access_identity), 0);
        assert_eq!(wave_of(&ids.certificate), 1);
        assert_eq!(wave_of(&ids.content_bucket_policy), 1);
        assert_eq!(wave_of(&ids.distribution), 2);
        assert_eq!(wave_of(&ids.a_record), 3);
        assert_eq!(wave_of(&ids.aaaa_record), 3);
    }

    // ========================================================================
    // Encoded Policies
    // ========================================================================

    #[test]
    fn test_certificate_region_is_fixed() {
        for region in [None, Some("eu-west-1"), Some("ap-southeast-2"), Some("us-east-1")] {
            let config = SiteConfig {
                region: region.map(str::to_string),
                ..SiteConfig::for_domain("example.org")
            };
            let site = declare_site(&config).unwrap();
            let certificate = site.graph.get(&site.ids.certificate).unwrap();
            assert_eq!(certificate.region.as_deref(), Some("us-east-1"));
        }
    }

    #[test]
    fn test_certificate_covers_domain() {
        let site = example_org();
        let certificate = site.graph.get(&site.ids.certificate).unwrap();
        let ResourceKind::Certificate(props) = &certificate.kind else {
            panic!("expected a certificate");
        };

        assert_eq!(props.domain_name, "*.example.org");
        assert_eq!(
            props.subject_alternative_names,
            vec!["example.org".to_string(), "www.example.org".to_string()]
        );
        assert_eq!(props.validation_method, "DNS");
        assert_eq!(props.domain_validation_options.len(), 3);
        assert!(props
            .domain_validation_options
            .iter()
            .all(|o| o.hosted_zone_id == Expr::Ref(site.ids.hosted_zone.clone())));
        assert_eq!(
            certificate.tags.get("Name").map(String::as_str),
            Some("WebsiteInfraStackDnsValidatedCertificate")
        );
    }

    #[test]
    fn test_buckets_are_private_and_retained() {
        let site = example_org();
        let buckets = site.graph.resources_of_type("AWS::S3::Bucket");
        assert_eq!(buckets.len(), 2);

        for bucket in buckets {
            let ResourceKind::Bucket(props) = &bucket.kind else {
                panic!("expected a bucket");
            };
            let block = props.public_access_block_configuration;
            assert!(block.block_public_acls);
            assert!(block.block_public_policy);
            assert!(block.ignore_public_acls);
            assert!(block.restrict_public_buckets);
            assert_eq!(bucket.removal_policy, RemovalPolicy::Retain);
        }

        for resource in site.graph.resources() {
            if resource.resource_type() != "AWS::S3::Bucket" {
                assert_eq!(resource.removal_policy, RemovalPolicy::Delete);
            }
        }
    }

    #[test]
    fn test_logging_bucket_never_serves_content() {
        let site = example_org();
        let origins: Vec<_> = site
            .graph
            .edges()
            .iter()
            .filter(|e| e.relation == Relation::Origin)
            .collect();
        assert_eq!(origins.len(), 1);
        assert_eq!(origins[0].target, site.ids.content_bucket);

        let readers = site.graph.dependents_of(&site.ids.logging_bucket);
        assert_eq!(readers, vec![&site.ids.distribution]);
    }

    #[test]
    fn test_read_grant_is_scoped_to_identity() {
        let site = example_org();
        let policy = site.graph.get(&site.ids.content_bucket_policy).unwrap();
        let ResourceKind::BucketPolicy(props) = &policy.kind else {
            panic!("expected a bucket policy");
        };

        assert_eq!(props.bucket, Expr::Ref(site.ids.content_bucket.clone()));
        assert_eq!(props.policy_document.statement.len(), 1);
        let statement = &props.policy_document.statement[0];
        assert_eq!(statement.effect, "Allow");
        assert_eq!(
            statement.principal.canonical_user,
            Expr::get_att(&site.ids.origin_access_identity, "S3CanonicalUserId")
        );
        assert!(statement.action.iter().all(|a| a.starts_with("s3:Get") || a.starts_with("s3:List")));
        assert_eq!(site.graph.resources_of_type("AWS::S3::BucketPolicy").len(), 1);
    }

    #[test]
    fn test_distribution_defaults() {
        let site = example_org();
        let distribution = site.graph.get(&site.ids.distribution).unwrap();
        let ResourceKind::Distribution(props) = &distribution.kind else {
            panic!("expected a distribution");
        };
        let config = &props.distribution_config;

        assert_eq!(config.aliases, vec!["example.org".to_string()]);
        assert!(config.enabled);
        assert!(config.ipv6_enabled);
        assert_eq!(config.http_version, "http2and3");
        assert_eq!(config.price_class, "PriceClass_100");
        assert_eq!(config.default_root_object, "index.html");
        assert_eq!(config.comment, "Distribution for the Static Site");

        let behavior = &config.default_cache_behavior;
        assert_eq!(behavior.viewer_protocol_policy, "redirect-to-https");
        assert!(behavior.compress);
        assert_eq!(behavior.default_ttl, 900);
        assert_eq!(behavior.min_ttl, 60);
        assert!(behavior.min_ttl < behavior.default_ttl);

        assert_eq!(config.viewer_certificate.ssl_support_method, "sni-only");
        assert_eq!(config.viewer_certificate.minimum_protocol_version, "TLSv1.2_2021");
        assert_eq!(
            config.viewer_certificate.acm_certificate_arn,
            Expr::Ref(site.ids.certificate.clone())
        );

        assert!(!config.logging.include_cookies);
        assert_eq!(config.logging.prefix, "logs/example.org/v0/");
    }

    #[test]
    fn test_error_responses() {
        let site = example_org();
        let ResourceKind::Distribution(props) =
            &site.graph.get(&site.ids.distribution).unwrap().kind
        else {
            panic!("expected a distribution");
        };
        let responses = &props.distribution_config.custom_error_responses;
        assert_eq!(responses.len(), 2);

        let forbidden = responses.iter().find(|r| r.error_code == 403).unwrap();
        assert_eq!(forbidden.response_code, 200);
        assert_eq!(forbidden.response_page_path, "/index.html");
        assert_eq!(forbidden.error_caching_min_ttl, 0);

        let not_found = responses.iter().find(|r| r.error_code == 404).unwrap();
        assert_eq!(not_found.response_code, 204);
        assert_eq!(not_found.response_page_path, "/index.html");
        assert_eq!(not_found.error_caching_min_ttl, 0);
    }

    #[test]
    fn test_exactly_two_apex_alias_records() {
        let site = example_org();
        let records = site.graph.resources_of_type("AWS::Route53::RecordSet");
        assert_eq!(records.len(), 2);

        let mut types = Vec::new();
        for record in records {
            let ResourceKind::RecordSet(props) = &record.kind else {
                panic!("expected a record set");
            };
            assert_eq!(props.record_name, "");
            assert_eq!(props.name, "example.org.");
            assert_eq!(
                props.alias_target.dns_name,
                Expr::get_att(&site.ids.distribution, "DomainName")
            );
            assert_eq!(props.alias_target.hosted_zone_id, "Z2FDTNDATAQYW2");
            assert_eq!(props.comment, "Alias record for example.org");
            types.push(props.record_type);
        }
        assert_eq!(types, vec![RecordType::A, RecordType::AAAA]);
    }

    // ========================================================================
    // Determinism and Configuration
    // ========================================================================

    #[test]
    fn test_declaration_is_deterministic() {
        let config = SiteConfig::for_domain("example.org");
        assert_eq!(declare_site(&config).unwrap(), declare_site(&config).unwrap());
    }

    #[test]
    fn test_ids_match_stack_name() {
        let config = SiteConfig {
            stack_name: "OtherStack".into(),
            ..SiteConfig::for_domain("example.org")
        };
        let site = declare_site(&config).unwrap();
        assert_eq!(site.ids, SiteResources::for_stack("OtherStack"));
        assert_ne!(site.ids, SiteResources::for_stack("WebsiteInfraStack"));
    }

    #[test]
    fn test_configured_values_flow_through() {
        let config = SiteConfig {
            default_ttl: "1h".into(),
            min_ttl: "5m".into(),
            root_object: "home.html".into(),
            log_version: "v3".into(),
            extra_subject_alternative_names: vec!["cake.example.org".into()],
            ..SiteConfig::for_domain("example.org")
        };
        let site = declare_site(&config).unwrap();
        let ResourceKind::Distribution(props) =
            &site.graph.get(&site.ids.distribution).unwrap().kind
        else {
            panic!("expected a distribution");
        };
        let dist = &props.distribution_config;
        assert_eq!(dist.default_cache_behavior.default_ttl, 3600);
        assert_eq!(dist.default_cache_behavior.min_ttl, 300);
        assert_eq!(dist.default_root_object, "home.html");
        assert!(dist
            .custom_error_responses
            .iter()
            .all(|r| r.response_page_path == "/home.html"));
        assert_eq!(dist.logging.prefix, "logs/example.org/v3/");

        let ResourceKind::Certificate(cert) = &site.graph.get(&site.ids.certificate).unwrap().kind
        else {
            panic!("expected a certificate");
        };
        assert!(cert
            .subject_alternative_names
            .contains(&"cake.example.org".to_string()));
    }

    #[test]
    fn test_invalid_config_is_rejected_before_building() {
        let err = declare_site(&SiteConfig::for_domain("not a domain")).unwrap_err();
        assert!(matches!(err, DeclarationError::Config(_)));
        assert_eq!(err.reason(), "InvalidDomain");
    }
}

//! Built-in provisioning step inventory
//!
//! The steps below take a bare Debian/Ubuntu host to a running application:
//! runtime, database, reverse proxy and process supervisor, then the
//! application itself, then best-effort hardening (firewall, certificates).
//! Every step carries a probe so a re-run only performs missing work.

use crate::core::config::Configuration;
use crate::core::settings::Settings;
use crate::core::step::{Artifact, Classification, Directive, Probe, Step};
use crate::secret;

/// The standard single-host bootstrap sequence.
pub fn builtin_steps(settings: &Settings, config: &Configuration) -> Vec<Step> {
    let root = settings.install_root.clone();
    let site = format!("/etc/nginx/sites-available/{}", settings.app_name);
    let site_link = format!("/etc/nginx/sites-enabled/{}", settings.app_name);
    // guaranteed by Configuration::assemble / Configuration::load
    let db_password = config.secret(secret::DB_PASSWORD).unwrap_or_default();

    vec![
        Step {
            id: "install-runtime".to_string(),
            summary: "Install the Node.js runtime".to_string(),
            depends_on: vec![],
            classification: Classification::Fatal,
            probe: Probe::CommandOutputContains {
                command: "node --version".to_string(),
                needle: "v20".to_string(),
            },
            action: vec![
                Directive::Run {
                    command: "apt-get update".to_string(),
                },
                Directive::Run {
                    command: "curl -fsSL https://deb.nodesource.com/setup_20.x | bash -"
                        .to_string(),
                },
                Directive::Run {
                    command: "DEBIAN_FRONTEND=noninteractive apt-get install -y nodejs"
                        .to_string(),
                },
            ],
        },
        Step {
            id: "install-database".to_string(),
            summary: "Install PostgreSQL".to_string(),
            depends_on: vec![],
            classification: Classification::Fatal,
            probe: Probe::CommandOk {
                command: "command -v psql".to_string(),
            },
            action: vec![
                Directive::Run {
                    command:
                        "DEBIAN_FRONTEND=noninteractive apt-get install -y postgresql postgresql-contrib"
                            .to_string(),
                },
                Directive::Run {
                    command: "systemctl enable --now postgresql".to_string(),
                },
            ],
        },
        Step {
            id: "install-proxy".to_string(),
            summary: "Install the nginx reverse proxy".to_string(),
            depends_on: vec![],
            classification: Classification::Fatal,
            probe: Probe::CommandOk {
                command: "command -v nginx".to_string(),
            },
            action: vec![
                Directive::Run {
                    command: "DEBIAN_FRONTEND=noninteractive apt-get install -y nginx".to_string(),
                },
                Directive::Run {
                    command: "systemctl enable --now nginx".to_string(),
                },
            ],
        },
        Step {
            id: "install-supervisor".to_string(),
            summary: "Install the PM2 process supervisor".to_string(),
            depends_on: vec!["install-runtime".to_string()],
            classification: Classification::Fatal,
            probe: Probe::CommandOk {
                command: "command -v pm2".to_string(),
            },
            action: vec![Directive::Run {
                command: "npm install -g pm2".to_string(),
            }],
        },
        Step {
            id: "create-database".to_string(),
            summary: "Create the application database and role".to_string(),
            depends_on: vec!["install-database".to_string()],
            classification: Classification::Fatal,
            probe: Probe::CommandOutputContains {
                command: "sudo -u postgres psql -lqt".to_string(),
                needle: settings.db_name.clone(),
            },
            action: vec![
                Directive::Run {
                    command: format!(
                        r#"sudo -u postgres psql -c "CREATE ROLE {} LOGIN PASSWORD '{}'""#,
                        settings.db_user, db_password
                    ),
                },
                Directive::Run {
                    command: format!(
                        "sudo -u postgres createdb -O {} {}",
                        settings.db_user, settings.db_name
                    ),
                },
            ],
        },
        Step {
            id: "fetch-app".to_string(),
            summary: "Clone the application repository".to_string(),
            depends_on: vec![],
            classification: Classification::Fatal,
            probe: Probe::PathExists {
                path: format!("{}/.git", root),
            },
            action: vec![Directive::Run {
                command: format!("git clone {} {}", settings.repo_url, root),
            }],
        },
        Step {
            id: "install-app-deps".to_string(),
            summary: "Install application dependencies".to_string(),
            depends_on: vec!["install-runtime".to_string(), "fetch-app".to_string()],
            classification: Classification::Fatal,
            probe: Probe::PathExists {
                path: format!("{}/node_modules", root),
            },
            action: vec![Directive::Run {
                command: format!("cd {} && npm install --production", root),
            }],
        },
        Step {
            id: "write-environment".to_string(),
            summary: "Write the application environment file".to_string(),
            depends_on: vec!["fetch-app".to_string(), "create-database".to_string()],
            classification: Classification::Fatal,
            probe: Probe::FileContains {
                path: format!("{}/.env", root),
                needle: format!("PUBLIC_DOMAIN={}", config.domain),
            },
            action: vec![Directive::Render {
                artifact: Artifact::EnvFile,
                dest: format!("{}/.env", root),
            }],
        },
        Step {
            id: "configure-proxy".to_string(),
            summary: "Configure the reverse proxy virtual host".to_string(),
            depends_on: vec!["install-proxy".to_string()],
            classification: Classification::Fatal,
            probe: Probe::FileContains {
                path: site.clone(),
                needle: format!("server_name {};", config.domain),
            },
            action: vec![
                Directive::Render {
                    artifact: Artifact::ProxyVhost,
                    dest: site.clone(),
                },
                Directive::Run {
                    command: format!("ln -sf {} {}", site, site_link),
                },
                Directive::Run {
                    command: "rm -f /etc/nginx/sites-enabled/default".to_string(),
                },
                Directive::Run {
                    command: "nginx -t && systemctl reload nginx".to_string(),
                },
            ],
        },
        Step {
            id: "configure-supervisor".to_string(),
            summary: "Write the process supervisor descriptor".to_string(),
            depends_on: vec![
                "install-supervisor".to_string(),
                "install-app-deps".to_string(),
                "write-environment".to_string(),
            ],
            classification: Classification::Fatal,
            probe: Probe::FileContains {
                path: format!("{}/ecosystem.config.json", root),
                needle: format!("\"name\": \"{}\"", settings.app_name),
            },
            action: vec![Directive::Render {
                artifact: Artifact::SupervisorDescriptor,
                dest: format!("{}/ecosystem.config.json", root),
            }],
        },
        Step {
            id: "start-app".to_string(),
            summary: "Start the application under supervision".to_string(),
            depends_on: vec![
                "configure-supervisor".to_string(),
                "configure-proxy".to_string(),
            ],
            classification: Classification::Fatal,
            probe: Probe::CommandOutputContains {
                command: "pm2 jlist".to_string(),
                needle: format!("\"name\":\"{}\"", settings.app_name),
            },
            action: vec![
                Directive::Run {
                    command: format!("cd {} && pm2 start ecosystem.config.json", root),
                },
                Directive::Run {
                    command: "pm2 save".to_string(),
                },
                Directive::Run {
                    command: format!(
                        "curl -fsS --retry 10 --retry-delay 3 --retry-connrefused http://127.0.0.1:{}/ >/dev/null",
                        settings.app_port
                    ),
                },
            ],
        },
        Step {
            id: "configure-firewall".to_string(),
            summary: "Enable the host firewall".to_string(),
            depends_on: vec![],
            classification: Classification::WarnOnly,
            probe: Probe::CommandOutputContains {
                command: "ufw status".to_string(),
                needle: "Status: active".to_string(),
            },
            action: vec![
                Directive::Run {
                    command: "ufw allow OpenSSH".to_string(),
                },
                Directive::Run {
                    command: "ufw allow 'Nginx Full'".to_string(),
                },
                Directive::Run {
                    command: "ufw --force enable".to_string(),
                },
            ],
        },
        Step {
            id: "provision-certificate".to_string(),
            summary: "Obtain a TLS certificate".to_string(),
            depends_on: vec!["configure-proxy".to_string()],
            classification: Classification::WarnOnly,
            probe: Probe::PathExists {
                path: format!("/etc/letsencrypt/live/{}/fullchain.pem", config.domain),
            },
            action: vec![
                Directive::Run {
                    command:
                        "DEBIAN_FRONTEND=noninteractive apt-get install -y certbot python3-certbot-nginx"
                            .to_string(),
                },
                Directive::Run {
                    command: format!(
                        "certbot certonly --nginx --non-interactive --agree-tos -m {} -d {}",
                        config.admin_email, config.domain
                    ),
                },
            ],
        },
        Step {
            id: "enable-tls".to_string(),
            summary: "Switch the proxy to TLS".to_string(),
            depends_on: vec!["provision-certificate".to_string()],
            classification: Classification::WarnOnly,
            // re-render when the TLS block is missing or the config is broken
            probe: Probe::CommandOk {
                command: format!("grep -q ssl_certificate {} && nginx -t", site),
            },
            action: vec![
                Directive::Render {
                    artifact: Artifact::ProxyVhostTls,
                    dest: site.clone(),
                },
                Directive::Run {
                    command: "nginx -t && systemctl reload nginx".to_string(),
                },
            ],
        },
    ]
}

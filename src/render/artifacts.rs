//! Artifact templates and their value map
//!
//! Three artifacts bring the host to a serving state: the application env
//! file, the nginx virtual host (with a TLS variant) and the PM2 process
//! descriptor. Templates only reference names produced by [`values`], and
//! rendering is deterministic for a given settings/configuration pair.

use crate::core::config::Configuration;
use crate::core::settings::Settings;
use crate::core::step::Artifact;
use crate::error::Result;
use crate::render::render;
use std::collections::HashMap;

const ENV_FILE: &str = "\
NODE_ENV={{ node_env }}
PORT={{ app_port }}
PUBLIC_DOMAIN={{ domain }}
DATABASE_URL=postgres://{{ db_user }}:{{ db_password }}@127.0.0.1:5432/{{ db_name }}
SESSION_SECRET={{ session_secret }}
SESSION_SECRET_EXPIRY={{ session_secret_expiry }}
ADMIN_USERNAME={{ admin_username }}
ADMIN_PASSWORD={{ admin_password }}
ADMIN_EMAIL={{ admin_email }}
TELEGRAM_BOT_TOKEN=
PAYMENT_API_KEY=
";

const PROXY_VHOST: &str = "\
server {
    listen 80;
    server_name {{ domain }};

    add_header X-Frame-Options \"SAMEORIGIN\" always;
    add_header X-Content-Type-Options \"nosniff\" always;
    add_header Referrer-Policy \"strict-origin-when-cross-origin\" always;

    location / {
        proxy_pass http://127.0.0.1:{{ app_port }};
        proxy_http_version 1.1;
        proxy_set_header Upgrade $http_upgrade;
        proxy_set_header Connection \"upgrade\";
        proxy_set_header Host $host;
        proxy_set_header X-Real-IP $remote_addr;
        proxy_set_header X-Forwarded-For $proxy_add_x_forwarded_for;
        proxy_set_header X-Forwarded-Proto $scheme;
    }
}
";

const PROXY_VHOST_TLS: &str = "\
server {
    listen 80;
    server_name {{ domain }};
    return 301 https://$host$request_uri;
}

server {
    listen 443 ssl http2;
    server_name {{ domain }};

    ssl_certificate /etc/letsencrypt/live/{{ domain }}/fullchain.pem;
    ssl_certificate_key /etc/letsencrypt/live/{{ domain }}/privkey.pem;

    add_header X-Frame-Options \"SAMEORIGIN\" always;
    add_header X-Content-Type-Options \"nosniff\" always;
    add_header Referrer-Policy \"strict-origin-when-cross-origin\" always;

    location / {
        proxy_pass http://127.0.0.1:{{ app_port }};
        proxy_http_version 1.1;
        proxy_set_header Upgrade $http_upgrade;
        proxy_set_header Connection \"upgrade\";
        proxy_set_header Host $host;
        proxy_set_header X-Real-IP $remote_addr;
        proxy_set_header X-Forwarded-For $proxy_add_x_forwarded_for;
        proxy_set_header X-Forwarded-Proto $scheme;
    }
}
";

const SUPERVISOR_DESCRIPTOR: &str = "\
{
  \"apps\": [
    {
      \"name\": \"{{ app_name }}\",
      \"cwd\": \"{{ install_root }}\",
      \"script\": \"{{ app_script }}\",
      \"env\": {
        \"NODE_ENV\": \"{{ node_env }}\",
        \"PORT\": \"{{ app_port }}\"
      },
      \"autorestart\": true,
      \"max_memory_restart\": \"{{ memory_limit }}\",
      \"max_restarts\": 10
    }
  ]
}
";

/// The allow-list of values templates may reference.
pub fn values(settings: &Settings, config: &Configuration) -> HashMap<String, String> {
    let mut map = HashMap::new();
    map.insert("node_env".to_string(), "production".to_string());
    map.insert("app_name".to_string(), settings.app_name.clone());
    map.insert("app_port".to_string(), settings.app_port.to_string());
    map.insert("install_root".to_string(), settings.install_root.clone());
    map.insert("app_script".to_string(), settings.app_script.clone());
    map.insert("db_name".to_string(), settings.db_name.clone());
    map.insert("db_user".to_string(), settings.db_user.clone());
    map.insert("memory_limit".to_string(), settings.memory_limit.clone());
    map.insert("domain".to_string(), config.domain.clone());
    map.insert(
        "admin_username".to_string(),
        config.admin_username.clone(),
    );
    map.insert("admin_password".to_string(), config.admin_password.clone());
    map.insert("admin_email".to_string(), config.admin_email.clone());
    map.insert("session_secret_expiry".to_string(), "7d".to_string());
    for (name, value) in &config.generated_secrets {
        map.insert(name.clone(), value.clone());
    }
    map
}

/// Render one artifact to its final text.
pub fn render_artifact(
    artifact: Artifact,
    settings: &Settings,
    config: &Configuration,
) -> Result<String> {
    let template = match artifact {
        Artifact::EnvFile => ENV_FILE,
        Artifact::ProxyVhost => PROXY_VHOST,
        Artifact::ProxyVhostTls => PROXY_VHOST_TLS,
        Artifact::SupervisorDescriptor => SUPERVISOR_DESCRIPTOR,
    };
    render(template, &values(settings, config))
}

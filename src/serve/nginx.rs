//! nginx configuration rendering for statically served artifacts.

const CONFIG_TEMPLATE: &str = r#"server {
    listen 80;
    server_name _;
    root /usr/share/nginx/html;
    index index.html;

    gzip on;
    gzip_types text/plain text/css application/json application/javascript text/xml application/xml image/svg+xml;
    gzip_min_length 256;

    add_header X-Frame-Options "SAMEORIGIN" always;
    add_header X-Content-Type-Options "nosniff" always;
    add_header Referrer-Policy "strict-origin-when-cross-origin" always;
    add_header Content-Security-Policy "default-src 'self' http: https: data: blob: 'unsafe-inline' 'unsafe-eval'" always;

    location / {
        try_files @TRY_FILES@;
    }

    location ~* \.(js|css|png|jpg|jpeg|gif|ico|svg|woff|woff2|ttf)$ {
        expires 30d;
        add_header Cache-Control "public, immutable";
    }
@HTML_RULE@}
"#;

const HTML_NO_CACHE: &str = r#"
    location ~* \.html$ {
        expires -1;
        add_header Cache-Control "no-store, no-cache, must-revalidate, max-age=0";
    }
"#;

/// Single-page apps rewrite unknown paths to `index.html` so client-side
/// routing survives a hard refresh.
pub fn spa_config() -> String {
    CONFIG_TEMPLATE
        .replace("@TRY_FILES@", "$uri $uri/ /index.html")
        .replace("@HTML_RULE@", "")
}

/// Plain static sites serve files as-is, 404 on misses, and keep HTML out
/// of browser caches so edits show up on refresh.
pub fn plain_config() -> String {
    CONFIG_TEMPLATE
        .replace("@TRY_FILES@", "$uri $uri/ =404")
        .replace("@HTML_RULE@", HTML_NO_CACHE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spa_config_rewrites_to_index() {
        let config = spa_config();
        assert!(config.contains("try_files $uri $uri/ /index.html;"));
        assert!(config.contains("listen 80;"));
        assert!(!config.contains("@TRY_FILES@"));
    }

    #[test]
    fn test_plain_config_404s_on_miss() {
        let config = plain_config();
        assert!(config.contains("try_files $uri $uri/ =404;"));
        assert!(!config.contains("/index.html;"));
        assert!(config.contains("no-cache"));
    }

    #[test]
    fn test_spa_config_caches_html_normally() {
        assert!(!spa_config().contains("no-cache"));
        assert!(!spa_config().contains("@HTML_RULE@"));
    }

    #[test]
    fn test_configs_carry_hardening_headers() {
        for config in [spa_config(), plain_config()] {
            assert!(config.contains("gzip on;"));
            assert!(config.contains("X-Content-Type-Options"));
            assert!(config.contains("Content-Security-Policy"));
            assert!(config.contains("expires 30d;"));
        }
    }
}

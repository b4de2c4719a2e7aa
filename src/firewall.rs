use std::fmt;

/// Firewall tooling a rendered rule targets.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize, schemars::JsonSchema,
)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    #[default]
    Iptables,
    Nftables,
    Ufw,
    Firewalld,
    Ipfw,
    Pf,
}

impl Dialect {
    pub const ALL: [Dialect; 6] = [
        Self::Iptables,
        Self::Nftables,
        Self::Ufw,
        Self::Firewalld,
        Self::Ipfw,
        Self::Pf,
    ];

    /// Rule forwarding traffic for `public:port` to `local:port`.
    pub fn add_rule(&self, local: &str, public: &str, port: impl fmt::Display) -> String {
        match self {
            Self::Iptables => format!(
                "iptables -t nat -A PREROUTING -p tcp -d {public} --dport {port} -j DNAT --to-destination {local}:{port}"
            ),
            Self::Nftables => format!(
                "nft add rule ip nat prerouting ip daddr {public} tcp dport {port} dnat to {local}:{port}"
            ),
            Self::Ufw => format!(
                "ufw route allow proto tcp from any to {public} port {port} comment 'DNAT to {local}:{port}'"
            ),
            Self::Firewalld => format!(
                "firewall-cmd --zone=public --add-rich-rule='{}'",
                rich_rule(local, port)
            ),
            Self::Ipfw => format!("ipfw add 100 fwd {local},{port} tcp from any to {public} {port}"),
            Self::Pf => {
                format!("rdr pass on egress proto tcp from any to {public} port {port} -> {local} port {port}")
            }
        }
    }

    /// Rule removing what [`Dialect::add_rule`] installs.
    pub fn delete_rule(&self, local: &str, public: &str, port: impl fmt::Display) -> String {
        match self {
            Self::Iptables => format!(
                "iptables -t nat -D PREROUTING -p tcp -d {public} --dport {port} -j DNAT --to-destination {local}:{port}"
            ),
            Self::Nftables => format!(
                "nft delete rule ip nat prerouting ip daddr {public} tcp dport {port} dnat to {local}:{port}"
            ),
            Self::Ufw => format!("ufw route delete allow proto tcp from any to {public} port {port}"),
            Self::Firewalld => format!(
                "firewall-cmd --zone=public --remove-rich-rule='{}'",
                rich_rule(local, port)
            ),
            Self::Ipfw => "ipfw delete 100".to_string(),
            Self::Pf => format!("no rdr pass on egress proto tcp from any to {public} port {port}"),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Iptables => "iptables",
            Self::Nftables => "nftables",
            Self::Ufw => "ufw",
            Self::Firewalld => "firewalld",
            Self::Ipfw => "ipfw",
            Self::Pf => "pf",
        }
    }
}

fn rich_rule(local: &str, port: impl fmt::Display) -> String {
    format!(r#"rule family="ipv4" forward-port port="{port}" protocol="tcp" to-addr="{local}" to-port="{port}""#)
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        f.write_str(self.as_str())
    }
}

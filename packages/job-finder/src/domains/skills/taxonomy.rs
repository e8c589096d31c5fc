//! The skill vocabulary: canonical skills grouped by category, the aliases
//! that resolve onto them, and the display rules for skill names.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkillCategory {
    Languages,
    Web,
    Databases,
    CloudDevops,
    DataMl,
    Mobile,
    Testing,
    Architecture,
    Collaboration,
    Security,
    Blockchain,
    SoftSkills,
}

impl SkillCategory {
    pub const ALL: [SkillCategory; 12] = [
        SkillCategory::Languages,
        SkillCategory::Web,
        SkillCategory::Databases,
        SkillCategory::CloudDevops,
        SkillCategory::DataMl,
        SkillCategory::Mobile,
        SkillCategory::Testing,
        SkillCategory::Architecture,
        SkillCategory::Collaboration,
        SkillCategory::Security,
        SkillCategory::Blockchain,
        SkillCategory::SoftSkills,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SkillCategory::Languages => "languages",
            SkillCategory::Web => "web",
            SkillCategory::Databases => "databases",
            SkillCategory::CloudDevops => "cloud_devops",
            SkillCategory::DataMl => "data_ml",
            SkillCategory::Mobile => "mobile",
            SkillCategory::Testing => "testing",
            SkillCategory::Architecture => "architecture",
            SkillCategory::Collaboration => "collaboration",
            SkillCategory::Security => "security",
            SkillCategory::Blockchain => "blockchain",
            SkillCategory::SoftSkills => "soft_skills",
        }
    }

    /// Canonical (lower-case) skills in this category
    pub fn skills(&self) -> &'static [&'static str] {
        match self {
            SkillCategory::Languages => &[
                "python", "java", "javascript", "typescript", "c++", "c#", "ruby", "go",
                "rust", "swift", "kotlin", "scala", "php", "perl", "r", "matlab", "julia",
                "objective-c", "dart", "elixir", "clojure", "haskell", "f#", "vb.net",
                "cobol", "fortran", "pascal", "lua", "groovy", "shell", "bash", "powershell",
            ],
            SkillCategory::Web => &[
                "html", "css", "sass", "less", "react", "angular", "vue", "svelte", "next.js",
                "nuxt", "gatsby", "webpack", "babel", "node.js", "express", "django", "flask",
                "fastapi", "rails", "ruby on rails", "asp.net", "spring", "spring boot",
                "laravel", "symfony",
            ],
            SkillCategory::Databases => &[
                "sql", "nosql", "postgresql", "mysql", "mariadb", "sqlite", "oracle", "mongodb",
                "cassandra", "redis", "elasticsearch", "dynamodb", "firestore", "neo4j",
                "graphql", "couchdb", "influxdb", "timescaledb", "cockroachdb",
            ],
            SkillCategory::CloudDevops => &[
                "aws", "azure", "gcp", "docker", "kubernetes", "terraform", "ansible",
                "jenkins", "github actions", "gitlab ci", "circleci", "travis ci",
                "cloudformation", "helm", "vagrant", "puppet", "chef", "saltstack",
                "prometheus", "grafana", "datadog", "new relic", "splunk", "elk stack",
                "ci/cd", "devops",
            ],
            SkillCategory::DataMl => &[
                "machine learning", "deep learning", "artificial intelligence", "tensorflow",
                "pytorch", "keras", "scikit-learn", "pandas", "numpy", "scipy", "matplotlib",
                "seaborn", "plotly", "jupyter", "spark", "hadoop", "airflow", "kafka", "flink",
                "storm", "hive", "presto", "dbt", "tableau", "power bi", "looker",
                "data science", "nlp", "computer vision", "opencv",
            ],
            SkillCategory::Mobile => &[
                "android", "ios", "react native", "flutter", "xamarin", "ionic", "cordova",
                "swiftui", "jetpack compose", "kotlin multiplatform",
            ],
            SkillCategory::Testing => &[
                "unit testing", "integration testing", "e2e testing", "jest", "mocha",
                "jasmine", "pytest", "unittest", "selenium", "cypress", "playwright",
                "puppeteer", "junit", "testng", "rspec", "cucumber", "tdd", "bdd", "qa",
                "quality assurance",
            ],
            SkillCategory::Architecture => &[
                "microservices", "serverless", "rest", "grpc", "soap", "event-driven",
                "domain-driven design", "ddd", "cqrs", "event sourcing", "design patterns",
                "solid principles", "clean architecture", "mvc", "mvvm", "mvi",
                "hexagonal architecture", "onion architecture", "12-factor",
            ],
            SkillCategory::Collaboration => &[
                "git", "github", "gitlab", "bitbucket", "svn", "mercurial", "agile", "scrum",
                "kanban", "jira", "confluence", "slack", "teams", "asana", "trello",
            ],
            SkillCategory::Security => &[
                "oauth", "jwt", "ssl", "tls", "encryption", "cryptography",
                "penetration testing", "owasp", "security scanning",
                "vulnerability assessment", "soc2", "gdpr", "pci compliance",
                "identity management", "iam", "rbac", "zero trust",
            ],
            SkillCategory::Blockchain => &[
                "blockchain", "ethereum", "solidity", "web3", "smart contracts", "defi", "nft",
                "ipfs", "metamask", "truffle", "hardhat", "ganache",
            ],
            SkillCategory::SoftSkills => &[
                "leadership", "mentoring", "communication", "problem-solving", "teamwork",
                "project management", "stakeholder management", "technical writing",
                "code review", "pair programming", "remote work", "cross-functional",
            ],
        }
    }

    /// First category listing `canonical`.
    pub fn of(canonical: &str) -> Option<SkillCategory> {
        SkillCategory::ALL
            .into_iter()
            .find(|category| category.skills().contains(&canonical))
    }
}

impl std::fmt::Display for SkillCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for SkillCategory {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        SkillCategory::ALL
            .into_iter()
            .find(|category| category.as_str() == s)
            .ok_or_else(|| anyhow::anyhow!("Invalid skill category: {}", s))
    }
}

/// Alternate spellings and abbreviations, mapped to their canonical skill.
pub const ALIASES: &[(&str, &str)] = &[
    ("js", "javascript"),
    ("ts", "typescript"),
    ("py", "python"),
    ("golang", "go"),
    ("node", "node.js"),
    ("nodejs", "node.js"),
    ("reactjs", "react"),
    ("react.js", "react"),
    ("angularjs", "angular"),
    ("vuejs", "vue"),
    ("vue.js", "vue"),
    ("nextjs", "next.js"),
    ("expressjs", "express"),
    ("express.js", "express"),
    ("psql", "postgresql"),
    ("postgres", "postgresql"),
    ("mongo", "mongodb"),
    ("k8s", "kubernetes"),
    ("amazon web services", "aws"),
    ("google cloud", "gcp"),
    ("google cloud platform", "gcp"),
    ("ml", "machine learning"),
    ("ai", "artificial intelligence"),
    ("sklearn", "scikit-learn"),
    ("swift ui", "swiftui"),
    ("restful", "rest"),
    ("ci/cd", "ci/cd"),
    ("continuous integration", "ci/cd"),
    ("frontend", "front-end"),
    ("backend", "back-end"),
    ("fullstack", "full-stack"),
    ("full stack", "full-stack"),
    ("ui/ux", "ui/ux"),
];

/// Skills that are also everyday English words. These only count when
/// the text capitalizes them.
pub const AMBIGUOUS: &[&str] = &[
    "go", "r", "less", "rest", "express", "spring", "rails", "chef", "puppet", "storm",
    "hive", "slack", "teams", "shell", "swift", "dart", "julia", "pascal", "ionic",
    "oracle", "soap", "helm", "flask", "spark", "jest", "mocha",
];

/// Skills rendered fully upper-case.
const ACRONYMS: &[&str] = &[
    "aws", "gcp", "sql", "nosql", "html", "css", "php", "jwt", "ssl", "tls", "iam", "rbac",
    "gdpr", "grpc", "nlp", "qa", "tdd", "bdd", "ddd", "cqrs", "mvc", "mvvm", "mvi", "nft",
    "ipfs", "dbt", "soc2", "owasp", "svn", "c++", "c#", "f#", "vb.net", "asp.net", "ci/cd",
    "ui/ux",
];

/// Every phrase the extractor recognizes, with the canonical skill it resolves to.
pub fn vocabulary() -> impl Iterator<Item = (&'static str, &'static str)> {
    SkillCategory::ALL
        .into_iter()
        .flat_map(|category| category.skills().iter().map(|skill| (*skill, *skill)))
        .chain(ALIASES.iter().copied())
}

/// Display name for a canonical skill.
///
/// Acronyms are upper-cased, dotted names capitalize their first segment
/// (`node.js` becomes `Node.js`) and everything else is title-cased on
/// spaces and hyphens. iOS keeps its own casing.
pub fn display_name(canonical: &str) -> String {
    let skill = canonical.trim().to_lowercase();

    if skill == "ios" {
        return "iOS".to_string();
    }
    if ACRONYMS.contains(&skill.as_str()) {
        return skill.to_uppercase();
    }
    if let Some((head, tail)) = skill.split_once('.') {
        return format!("{}.{}", capitalize(head), tail);
    }

    let mut out = String::with_capacity(skill.len());
    let mut at_word_start = true;
    for c in skill.chars() {
        if at_word_start {
            out.extend(c.to_uppercase());
        } else {
            out.push(c);
        }
        at_word_start = c == ' ' || c == '-';
    }
    out
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

use clap::Parser;

#[derive(Parser, Debug, Clone)]
pub struct DiskMcConfig {
    #[arg(long, default_value = "")]
    input: String,
    #[arg(long, default_value = "./out")]
    output_dir: String,
    #[arg(long, default_value_t = 1337)]
    seed: u64,
}

impl DiskMcConfig {
    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn output_dir(&self) -> &str {
        &self.output_dir
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn set_output_dir(&mut self, s: &str) {
        self.output_dir = s.to_string();
    }

    pub fn toml(&self) -> String {
        format!("{}/config.toml", self.output_dir())
    }

    pub fn trajectory(&self) -> String {
        format!("{}/trajectory.xyz", self.output_dir())
    }

    pub fn snapshot(&self) -> String {
        format!("{}/final.json", self.output_dir())
    }

    pub fn stats(&self) -> String {
        format!("{}/stats.txt", self.output_dir())
    }
}

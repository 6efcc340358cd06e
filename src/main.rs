fn main() -> anyhow::Result<()> {
    project_dashboard_lib::run()
}

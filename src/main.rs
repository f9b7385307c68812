fn main() -> Result<(), Box<dyn std::error::Error>> {
    twig::cli::main()
}
